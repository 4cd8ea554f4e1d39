//! Event dispatcher task.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::webhook::WebhookNotifier;
use super::BookingEvent;

/// Where dispatched events end up.
pub enum NotificationSink {
    /// Structured log lines only (default).
    Log,
    /// Forward each event as JSON to an external notifier endpoint.
    Webhook(WebhookNotifier),
    /// Capture events for assertions.
    #[cfg(test)]
    Capture(mpsc::UnboundedSender<BookingEvent>),
}

impl NotificationSink {
    async fn deliver(&self, event: &BookingEvent) {
        match self {
            Self::Log => {
                info!(event = ?event, "Notification event");
            }
            Self::Webhook(notifier) => {
                if let Err(e) = notifier.send(event).await {
                    warn!(error = %e, "Notification delivery failed");
                }
            }
            #[cfg(test)]
            Self::Capture(tx) => {
                let _ = tx.send(event.clone());
            }
        }
    }
}

/// Spawn the dispatcher loop. Runs until every event sender is dropped.
pub fn spawn_dispatcher(
    mut rx: mpsc::UnboundedReceiver<BookingEvent>,
    sink: NotificationSink,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            sink.deliver(&event).await;
        }
        info!("Notification dispatcher stopped");
    })
}
