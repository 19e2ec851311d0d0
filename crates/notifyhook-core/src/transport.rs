//! Transport traits: how adapters reach the outside world.
//!
//! Adapters never talk to the network or the mail system directly; they build
//! an [`OutboundRequest`] or [`MailMessage`] and hand it to one of these.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Timeout applied to every outbound POST unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A single outbound POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub timeout: Duration,
}

impl OutboundRequest {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: body.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// POST with a JSON body and the matching content type.
    pub fn json(url: impl Into<String>, payload: &serde_json::Value) -> Self {
        Self::new(url, payload.to_string()).header("Content-Type", "application/json")
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw provider response. Interpreting it is the adapter's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP POST with no retry.
///
/// Only transport-level problems (DNS, connect, TLS, timeout) are errors.
/// Any completed exchange is returned as a [`RawResponse`], whatever its status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: OutboundRequest) -> Result<RawResponse>;
}

/// A plain-text email ready for local submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// Render as an RFC 5322 message with CRLF line endings.
    pub fn render(&self) -> String {
        format!(
            "To: {}\r\nFrom: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
            self.to,
            self.from,
            self.subject,
            self.body.replace("\r\n", "\n").replace('\n', "\r\n"),
        )
    }
}

/// Local mail submission facility.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn submit(&self, message: MailMessage) -> Result<()>;
}
