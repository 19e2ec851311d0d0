//! Channel trait: abstraction over notification delivery providers.

use std::fmt;

use async_trait::async_trait;
use crate::error::Result;

/// The closed set of providers the relay can deliver to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Teams,
    Telegram,
    Slack,
    Discord,
    Ntfy,
    Email,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 6] = [
        Self::Teams,
        Self::Telegram,
        Self::Slack,
        Self::Discord,
        Self::Ntfy,
        Self::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teams => "teams",
            Self::Telegram => "telegram",
            Self::Slack => "slack",
            Self::Discord => "discord",
            Self::Ntfy => "ntfy",
            Self::Email => "email",
        }
    }

    /// Look up a kind by its config name. Case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel adapter trait: implement this for each delivery provider.
///
/// An adapter owns its channel's settings and turns a plain text message into
/// the provider's wire request, then decides whether the provider accepted it.
///
/// # Example
///
/// ```rust,ignore
/// struct PagerChannel { transport: Arc<dyn Transport>, url: String }
///
/// #[async_trait]
/// impl ChannelAdapter for PagerChannel {
///     fn kind(&self) -> ChannelKind { ChannelKind::Slack }
///     async fn send(&self, message: &str) -> Result<()> {
///         let req = OutboundRequest::json(&self.url, &json!({ "text": message }));
///         self.transport.post(req).await.map(|_| ())
///     }
/// }
/// ```
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Provider this adapter speaks to.
    fn kind(&self) -> ChannelKind;

    /// Deliver `message`. Any error becomes this channel's failure reason.
    async fn send(&self, message: &str) -> Result<()>;
}
