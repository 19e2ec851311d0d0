//! Email channel: plain-text mail handed to the local mail system.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use notifyhook_core::channel::{ChannelAdapter, ChannelKind};
use notifyhook_core::config::EmailSettings;
use notifyhook_core::error::{RelayError, Result};
use notifyhook_core::transport::{MailMessage, Mailer};

use super::Delivery;

/// Characters of the message carried into the subject line.
const SUBJECT_CHARS: usize = 60;

pub struct EmailChannel {
    settings: EmailSettings,
    mailer: Arc<dyn Mailer>,
    timeout: Duration,
}

impl EmailChannel {
    pub fn new(settings: EmailSettings, delivery: &Delivery) -> Self {
        Self {
            settings,
            mailer: delivery.mailer.clone(),
            timeout: delivery.timeout,
        }
    }

    pub fn compose(&self, message: &str) -> MailMessage {
        MailMessage {
            to: self.settings.to.clone(),
            from: self.settings.from.clone(),
            subject: subject_line(&self.settings.subject_prefix, message),
            body: message.to_string(),
        }
    }
}

/// `prefix + " " + first 60 chars`, flattened to a single header line.
fn subject_line(prefix: &str, message: &str) -> String {
    let head: String = message
        .chars()
        .take(SUBJECT_CHARS)
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    format!("{} {}", prefix, head)
}

#[async_trait]
impl ChannelAdapter for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, message: &str) -> Result<()> {
        debug!("Email → {}", self.settings.to);
        match tokio::time::timeout(self.timeout, self.mailer.submit(self.compose(message))).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Mail submission to {} timed out", self.settings.to);
                Err(RelayError::Mail(format!("sendmail timed out after {:?}", self.timeout)))
            }
        }
    }
}
