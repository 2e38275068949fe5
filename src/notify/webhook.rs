//! Best-effort webhook delivery of audit results.

use crate::protocol::models::AuditResult;
use reqwest::Client;
use tracing::{debug, warn};

/// Forwards results to an optional webhook.
///
/// Delivery never fails the caller: errors and non-success statuses are
/// logged and dropped.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Option<String>,
}

impl WebhookNotifier {
    /// Create a notifier. With no URL every call is a no-op.
    pub fn new(client: Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    /// Whether a webhook is configured.
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    /// POST the result and wait for the outcome.
    ///
    /// Returns whether the webhook accepted it.
    pub async fn deliver(&self, result: &AuditResult) -> bool {
        let Some(url) = self.url.as_deref() else {
            return false;
        };

        match self.client.post(url).json(result).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(status = response.status().as_u16(), "webhook delivered");
                true
            }
            Ok(response) => {
                warn!(status = response.status().as_u16(), "webhook rejected audit result");
                false
            }
            Err(e) => {
                warn!(error = %e, "webhook delivery failed");
                false
            }
        }
    }

    /// Deliver on a detached task so the caller never waits.
    pub fn notify(&self, result: &AuditResult) {
        if !self.is_enabled() {
            return;
        }
        let notifier = self.clone();
        let result = result.clone();
        tokio::spawn(async move {
            notifier.deliver(&result).await;
        });
    }
}
