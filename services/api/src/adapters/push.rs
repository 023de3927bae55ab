//! services/api/src/adapters/push.rs
//!
//! The push-messaging adapter: posts reminder payloads to the FCM send
//! endpoint. Delivery is fire-and-forget; a rejected token is reported to
//! the caller and never retried here.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use lifelog_core::domain::ReminderMessage;
use lifelog_core::ports::{PushError, PushMessenger};

pub struct FcmPush {
    http: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl FcmPush {
    pub fn new(endpoint: String, server_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            server_key,
        }
    }
}

#[async_trait]
impl PushMessenger for FcmPush {
    async fn send(&self, token: &str, message: &ReminderMessage) -> Result<(), PushError> {
        let payload = serde_json::json!({
            "to": token,
            "notification": {
                "title": message.title,
                "body": message.body,
                "icon": "/icon.png",
                "badge": "/badge.png",
            },
            "data": {
                "type": message.kind,
                "timestamp": Utc::now().to_rfc3339(),
                "click_action": message.link,
            },
        });

        // Log only a token prefix.
        debug!(
            token = %token.chars().take(10).collect::<String>(),
            kind = %message.kind,
            "sending push message"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("key={}", self.server_key),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = %status, "push endpoint rejected the message");
            return Err(PushError::Rejected(format!("status {status}: {body}")));
        }
        Ok(())
    }
}
