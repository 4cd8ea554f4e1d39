//! Shared gRPC utility helpers.

use tonic::Status;
use tracing::warn;

use washbay_proto::v1::AppointmentStatus as ProtoStatus;

use crate::booking::{AppointmentStatus, BookingError};
use crate::storage::DatabaseError;

/// Convert a unix-seconds timestamp into a protobuf `Timestamp`.
pub fn to_timestamp(secs: i64) -> Option<prost_types::Timestamp> {
    Some(prost_types::Timestamp {
        seconds: secs,
        nanos: 0,
    })
}

/// Empty strings on the wire mean "not set" for optional references.
pub fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Map booking failures onto gRPC status codes.
///
/// Not-found kinds map to `NOT_FOUND`, precondition kinds to
/// `FAILED_PRECONDITION`, malformed input to `INVALID_ARGUMENT`. Backend
/// failures are logged server-side and surface as an opaque `INTERNAL`.
#[allow(clippy::needless_pass_by_value)]
pub fn booking_error_to_status(e: BookingError) -> Status {
    match &e {
        BookingError::VendorUnavailable(_)
        | BookingError::InsufficientCoins { .. }
        | BookingError::InvalidReferralCode(_)
        | BookingError::SelfReferral
        | BookingError::ReferralAlreadyRedeemed => Status::failed_precondition(e.to_string()),

        BookingError::CustomerNotFound(_)
        | BookingError::AppointmentNotFound(_)
        | BookingError::ServiceNotFound(_)
        | BookingError::UserNotFound(_) => Status::not_found(e.to_string()),

        BookingError::InvalidStatus(_) | BookingError::InvalidRequest(_) => {
            Status::invalid_argument(e.to_string())
        }

        BookingError::Database(db) => {
            warn!(error = %db, "Database error in booking operation");
            Status::internal("Internal error")
        }
    }
}

/// Map storage failures onto gRPC status codes.
#[allow(clippy::needless_pass_by_value)]
pub fn db_error_to_status(e: DatabaseError) -> Status {
    match e {
        DatabaseError::NotFound(msg) => Status::not_found(msg),
        other => {
            warn!(error = %other, "Database error");
            Status::internal("Internal error")
        }
    }
}

/// Decode a wire status enum value into a domain status.
///
/// `UNSPECIFIED` decodes to `None` (no filter / keep current); unknown values
/// are an `INVALID_ARGUMENT`.
#[allow(clippy::result_large_err)]
pub fn decode_status(value: i32) -> Result<Option<AppointmentStatus>, Status> {
    match ProtoStatus::try_from(value) {
        Ok(ProtoStatus::Unspecified) => Ok(None),
        Ok(ProtoStatus::Pending) => Ok(Some(AppointmentStatus::Pending)),
        Ok(ProtoStatus::Confirmed) => Ok(Some(AppointmentStatus::Confirmed)),
        Ok(ProtoStatus::Completed) => Ok(Some(AppointmentStatus::Completed)),
        Ok(ProtoStatus::Cancelled) => Ok(Some(AppointmentStatus::Cancelled)),
        Ok(ProtoStatus::CancelledByCustomer) => Ok(Some(AppointmentStatus::CancelledByCustomer)),
        Ok(ProtoStatus::NoShow) => Ok(Some(AppointmentStatus::NoShow)),
        Err(_) => Err(Status::invalid_argument("unknown appointment status")),
    }
}

/// Encode a stored status string for the wire.
pub fn encode_status(status: &str) -> ProtoStatus {
    match status {
        "pending" => ProtoStatus::Pending,
        "confirmed" => ProtoStatus::Confirmed,
        "completed" => ProtoStatus::Completed,
        "cancelled" => ProtoStatus::Cancelled,
        "cancelled_by_customer" => ProtoStatus::CancelledByCustomer,
        "no_show" => ProtoStatus::NoShow,
        _ => ProtoStatus::Unspecified,
    }
}
