//! HTTP webhook sink.
//!
//! Posts each event as JSON to an external notifier service (which owns the
//! actual email/push delivery). The server never retries; a missed
//! notification is acceptable, a blocked booking is not.

use std::time::Duration;

use thiserror::Error;

use super::BookingEvent;

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notifier endpoint returned status {status}")]
    Endpoint { status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Client for the external notifier endpoint.
#[derive(Debug)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a new webhook notifier.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        if url.is_empty() {
            return Err(NotifyError::Config("webhook url is empty".into()));
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed -- safe to ignore.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }

    /// Deliver one event. Called by the dispatcher; errors are logged there.
    pub async fn send(&self, event: &BookingEvent) -> Result<(), NotifyError> {
        let resp = self.http.post(&self.url).json(event).send().await?;

        if !resp.status().is_success() {
            return Err(NotifyError::Endpoint {
                status: resp.status().as_u16(),
            });
        }

        Ok(())
    }
}
