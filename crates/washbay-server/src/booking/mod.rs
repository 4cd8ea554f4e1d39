//! Booking and reward coordination.
//!
//! Everything that touches the coin wallet goes through this module: booking
//! with a coin discount, the completion reward, referral bonuses, and manual
//! admin adjustments. Each flow validates its preconditions, then applies the
//! business fact and its wallet effect inside one SQLite transaction, so the
//! "balance = sum of transactions" invariant can only be enforced (or broken)
//! in one place.

mod coordinator;
mod error;
mod ledger;
mod referral;
mod status;

#[cfg(test)]
mod tests;

pub use coordinator::{AppointmentUpdate, BookingCoordinator, NewAppointment};
pub use error::BookingError;
pub use referral::ReferralOutcome;
pub use status::AppointmentStatus;
