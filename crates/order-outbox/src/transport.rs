//! Awaited transport for envelope delivery.

use crate::{Envelope, OutboxError, OutboxResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Delivers one envelope, bounded by `timeout`.
///
/// `Ok(())` means the endpoint received the envelope. Any error is treated
/// by the relay as a transmission failure and retried.
#[async_trait]
pub trait OrderTransport: Send + Sync {
    async fn send(&self, envelope: &Envelope, timeout: Duration) -> OutboxResult<()>;
}

/// Posts envelopes to the order webhook.
///
/// No response schema is consumed: any completed HTTP exchange counts as
/// delivered, whatever the status code. Non-2xx statuses are logged.
#[derive(Clone)]
pub struct WebhookSender {
    client: Client,
    endpoint: String,
}

impl WebhookSender {
    /// Create a sender for `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> OutboxResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("mieza-order-outbox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OutboxError::Transmission(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OrderTransport for WebhookSender {
    async fn send(&self, envelope: &Envelope, timeout: Duration) -> OutboxResult<()> {
        debug!(
            url = %self.endpoint,
            envelope_id = %envelope.id,
            timeout_ms = timeout.as_millis() as u64,
            "Posting envelope"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&envelope.wire_body())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OutboxError::Timeout(timeout)
                } else {
                    OutboxError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                envelope_id = %envelope.id,
                status = status.as_u16(),
                "Webhook answered with non-success status; treating as delivered"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_keeps_endpoint() {
        let sender = WebhookSender::new("https://hooks.example.com/orders").unwrap();
        assert_eq!(sender.endpoint(), "https://hooks.example.com/orders");
    }
}
