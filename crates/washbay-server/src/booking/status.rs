//! Appointment lifecycle states.

use std::fmt;
use std::str::FromStr;

use super::error::BookingError;

/// Status of an appointment.
///
/// Direct bookings start at `Confirmed`; administrative creation paths may
/// start at `Pending`. Transitions between any two states are allowed so
/// staff can correct mistakes (e.g. undo an accidental cancellation); the
/// completion reward is guarded separately and fires at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    CancelledByCustomer,
    NoShow,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::CancelledByCustomer => "cancelled_by_customer",
            Self::NoShow => "no_show",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "cancelled_by_customer" => Ok(Self::CancelledByCustomer),
            "no_show" => Ok(Self::NoShow),
            other => Err(BookingError::InvalidStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::CancelledByCustomer,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("rescheduled".parse::<AppointmentStatus>().is_err());
    }
}
