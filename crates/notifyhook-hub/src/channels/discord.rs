//! Discord channel: channel webhook, `{"content": ...}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use notifyhook_core::channel::{ChannelAdapter, ChannelKind};
use notifyhook_core::config::WebhookSettings;
use notifyhook_core::error::Result;
use notifyhook_core::transport::{OutboundRequest, Transport};

use super::Delivery;
use crate::transport::http::host_of;

pub struct DiscordChannel {
    settings: WebhookSettings,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl DiscordChannel {
    pub fn new(settings: WebhookSettings, delivery: &Delivery) -> Self {
        Self {
            settings,
            transport: delivery.transport.clone(),
            timeout: delivery.timeout,
        }
    }
}

#[async_trait]
impl ChannelAdapter for DiscordChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Discord
    }

    async fn send(&self, message: &str) -> Result<()> {
        debug!("Discord → {}", host_of(&self.settings.webhook_url));
        let req = OutboundRequest::json(&self.settings.webhook_url, &json!({ "content": message }))
            .timeout(self.timeout);
        self.transport.post(req).await?;
        Ok(())
    }
}
