//! Telegram channel: Bot API `sendMessage`, no SDK.
//!
//! The Bot API answers 200 even when it refuses a message, so success is
//! decided by the `ok` flag in the response body, not by the status code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use notifyhook_core::channel::{ChannelAdapter, ChannelKind};
use notifyhook_core::config::TelegramSettings;
use notifyhook_core::error::{RelayError, Result};
use notifyhook_core::transport::{OutboundRequest, Transport};

use super::Delivery;

pub struct TelegramChannel {
    settings: TelegramSettings,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl TelegramChannel {
    pub fn new(settings: TelegramSettings, delivery: &Delivery) -> Self {
        Self {
            settings,
            transport: delivery.transport.clone(),
            timeout: delivery.timeout,
        }
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.bot_token
        )
    }

    /// Replace the bot token wherever it appears in `text`.
    fn redact(&self, text: &str) -> String {
        if self.settings.bot_token.is_empty() {
            return text.to_string();
        }
        text.replace(&self.settings.bot_token, "<redacted>")
    }
}

// ─── API Types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send(&self, message: &str) -> Result<()> {
        let url = self.send_message_url();
        debug!("Telegram → chat {}", self.settings.chat_id);

        let payload = json!({
            "chat_id": self.settings.chat_id,
            "text": message,
            "parse_mode": "HTML",
        });
        let req = OutboundRequest::json(url, &payload).timeout(self.timeout);

        let resp = self.transport.post(req).await.map_err(|e| match e {
            RelayError::Transport { url, reason } => RelayError::Transport {
                url: self.redact(&url),
                reason: self.redact(&reason),
            },
            other => other,
        })?;

        match serde_json::from_str::<TelegramResponse>(&resp.body) {
            Ok(TelegramResponse { ok: true, .. }) => Ok(()),
            Ok(TelegramResponse { description, .. }) => {
                warn!("Telegram rejected message: {:?}", description);
                Err(RelayError::ProviderRejection(
                    description.unwrap_or_else(|| "Telegram send failed".to_string()),
                ))
            }
            Err(e) => {
                warn!("Unreadable Telegram response (HTTP {}): {}", resp.status, e);
                Err(RelayError::ProviderRejection("Telegram send failed".to_string()))
            }
        }
    }
}
