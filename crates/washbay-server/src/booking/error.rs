//! Error taxonomy for the booking coordinator.
//!
//! Everything except `Database` is a recoverable, user-facing failure that
//! aborts the whole operation before any write lands. `Database` wraps
//! transient backend failures and propagates unchanged; retry is a manual
//! caller action.

use thiserror::Error;
use washbay_core::db::DatabaseError;

#[derive(Debug, Error)]
pub enum BookingError {
    /// Vendor missing or banned.
    #[error("vendor {0} is not available for booking")]
    VendorUnavailable(String),

    /// Customer record missing at debit time (or a guest tried to spend coins).
    #[error("customer {0} not found")]
    CustomerNotFound(String),

    #[error("insufficient coins: balance {have}, requested {need}")]
    InsufficientCoins { have: i64, need: i64 },

    #[error("appointment {0} not found")]
    AppointmentNotFound(String),

    #[error("service {0} not found")]
    ServiceNotFound(String),

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("unknown appointment status: {0}")]
    InvalidStatus(String),

    #[error("referral code {0} is not valid")]
    InvalidReferralCode(String),

    #[error("a referral code cannot be redeemed by its owner")]
    SelfReferral,

    #[error("a referral code has already been redeemed for this account")]
    ReferralAlreadyRedeemed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.into())
    }
}
