//! Error types for notifyhook.

use thiserror::Error;

/// Core error type for all relay operations.
///
/// The `Display` text of the channel-level variants is exactly what ends up
/// in the `errors` map of a dispatch report.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Channel not found or disabled")]
    ChannelUnavailable,

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("HTTP POST failed to: {url} ({reason})")]
    Transport { url: String, reason: String },

    #[error("{0}")]
    ProviderRejection(String),

    #[error("mail submission failed: {0}")]
    Mail(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Whether this error aborts the whole request rather than one channel.
    pub fn is_request_level(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_level_messages() {
        assert_eq!(
            RelayError::ChannelUnavailable.to_string(),
            "Channel not found or disabled"
        );
        assert_eq!(
            RelayError::UnknownChannel("pager".into()).to_string(),
            "Unknown channel: pager"
        );
        assert_eq!(
            RelayError::ProviderRejection("bad chat id".into()).to_string(),
            "bad chat id"
        );
        let err = RelayError::Transport {
            url: "https://hooks.example/x".into(),
            reason: "connection refused".into(),
        };
        assert!(err.to_string().contains("https://hooks.example/x"));
    }

    #[test]
    fn test_request_level_classification() {
        assert!(RelayError::Unauthorized.is_request_level());
        assert!(RelayError::Validation("x".into()).is_request_level());
        assert!(!RelayError::ChannelUnavailable.is_request_level());
        assert!(!RelayError::Mail("x".into()).is_request_level());
    }
}
