pub mod discord;
pub mod email;
pub mod ntfy;
pub mod slack;
pub mod teams;
pub mod telegram;

pub use discord::DiscordChannel;
pub use email::EmailChannel;
pub use ntfy::NtfyChannel;
pub use slack::SlackChannel;
pub use teams::TeamsChannel;
pub use telegram::TelegramChannel;

use std::sync::Arc;
use std::time::Duration;

use notifyhook_core::channel::ChannelAdapter;
use notifyhook_core::config::ChannelSettings;
use notifyhook_core::transport::{DEFAULT_TIMEOUT, Mailer, Transport};

/// What an adapter needs to reach its provider.
#[derive(Clone)]
pub struct Delivery {
    pub transport: Arc<dyn Transport>,
    pub mailer: Arc<dyn Mailer>,
    pub timeout: Duration,
}

impl Delivery {
    pub fn new(transport: Arc<dyn Transport>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            transport,
            mailer,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the adapter for a channel's settings.
///
/// Returns `None` for kinds the relay has no adapter for.
pub fn adapter_for(settings: &ChannelSettings, delivery: &Delivery) -> Option<Arc<dyn ChannelAdapter>> {
    let adapter: Arc<dyn ChannelAdapter> = match settings {
        ChannelSettings::Teams(s) => Arc::new(TeamsChannel::new(s.clone(), delivery)),
        ChannelSettings::Telegram(s) => Arc::new(TelegramChannel::new(s.clone(), delivery)),
        ChannelSettings::Slack(s) => Arc::new(SlackChannel::new(s.clone(), delivery)),
        ChannelSettings::Discord(s) => Arc::new(DiscordChannel::new(s.clone(), delivery)),
        ChannelSettings::Ntfy(s) => Arc::new(NtfyChannel::new(s.clone(), delivery)),
        ChannelSettings::Email(s) => Arc::new(EmailChannel::new(s.clone(), delivery)),
        ChannelSettings::Unknown { .. } => return None,
    };
    Some(adapter)
}
