//! Post-commit notification dispatch.
//!
//! The booking coordinator emits domain events after its transaction
//! commits; a dispatcher task consumes them and hands them to the configured
//! sink. Delivery is fire-and-forget: every failure is logged and swallowed,
//! so a notification problem can never be mistaken for a ledger failure.

mod dispatcher;
mod webhook;

pub use dispatcher::{NotificationSink, spawn_dispatcher};
pub use webhook::{NotifyError, WebhookNotifier};

use serde::Serialize;

/// Domain events emitted by the booking coordinator after a commit.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEvent {
    AppointmentCreated {
        appointment_id: String,
        vendor_id: String,
        customer_id: Option<String>,
        starts_at: i64,
    },
    AppointmentCompleted {
        appointment_id: String,
        vendor_id: String,
        customer_id: Option<String>,
        coin_reward: i64,
    },
    AppointmentStatusChanged {
        appointment_id: String,
        vendor_id: String,
        customer_id: Option<String>,
        from: String,
        to: String,
    },
}
