//! Message types: what flows into the dispatcher and what comes back out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// An inbound notification, already authenticated and decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub message: String,
    /// Target channel name. `None` fans out to every enabled channel.
    #[serde(default)]
    pub channel: Option<String>,
}

impl NotificationRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Decode a request body. Anything that does not decode becomes an
    /// empty request, which then fails validation like a blank message.
    pub fn from_json_lossy(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!("Undecodable notification body: {}", e);
                Self::default()
            }
        }
    }

    /// The trimmed message, or a validation error if nothing is left.
    pub fn validated_message(&self) -> Result<&str> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err(RelayError::Validation("\"message\" is required".to_string()));
        }
        Ok(message)
    }
}

/// Result of delivering to a single channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Failed(String),
}

impl From<Result<()>> for DispatchOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::Sent,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Aggregate result of one dispatch. Serializes to the relay's response body:
/// `{"success": bool, "sent": [..], "errors": {..}}`, with `errors` omitted
/// when nothing failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    success: bool,
    sent: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    errors: BTreeMap<String, String>,
}

impl DispatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one channel's outcome into the report.
    pub fn record(&mut self, channel: &str, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent => self.sent.push(channel.to_string()),
            DispatchOutcome::Failed(reason) => {
                self.errors.insert(channel.to_string(), reason);
            }
        }
        self.success = !self.sent.is_empty();
    }

    /// True iff at least one channel was sent, regardless of failures.
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Outcome recorded for `channel`, if it was a target.
    pub fn outcome(&self, channel: &str) -> Option<DispatchOutcome> {
        if self.sent.iter().any(|c| c == channel) {
            return Some(DispatchOutcome::Sent);
        }
        self.errors
            .get(channel)
            .map(|reason| DispatchOutcome::Failed(reason.clone()))
    }
}

/// Body of the "list enabled channels" read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelList {
    pub channels: Vec<String>,
}
