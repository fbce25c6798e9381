//! Discord webhook sink.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::NotifyError;
use crate::Notifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts messages to a Discord webhook as `{"content": ...}`.
pub struct DiscordWebhook {
    url: String,
    http: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new(url: String, http: reqwest::Client) -> Self {
        Self { url, http }
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({ "content": message });
        let response = self
            .http
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        debug!("notification delivered to webhook");
        Ok(())
    }
}
