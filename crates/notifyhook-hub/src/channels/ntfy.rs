//! ntfy channel: plain-text POST to `<server>/<topic>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use notifyhook_core::channel::{ChannelAdapter, ChannelKind};
use notifyhook_core::config::NtfySettings;
use notifyhook_core::error::Result;
use notifyhook_core::transport::{OutboundRequest, Transport};

use super::Delivery;

pub struct NtfyChannel {
    settings: NtfySettings,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl NtfyChannel {
    pub fn new(settings: NtfySettings, delivery: &Delivery) -> Self {
        Self {
            settings,
            transport: delivery.transport.clone(),
            timeout: delivery.timeout,
        }
    }

    fn topic_url(&self) -> String {
        format!("{}/{}", self.settings.url.trim_end_matches('/'), self.settings.topic)
    }
}

#[async_trait]
impl ChannelAdapter for NtfyChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Ntfy
    }

    async fn send(&self, message: &str) -> Result<()> {
        let url = self.topic_url();
        debug!("ntfy → {}", url);

        let mut req = OutboundRequest::new(url, message)
            .header("Content-Type", "text/plain; charset=utf-8")
            .timeout(self.timeout);
        if let Some(token) = self.settings.token.as_deref().filter(|t| !t.is_empty()) {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        self.transport.post(req).await?;
        Ok(())
    }
}
