//! Microsoft Teams channel: incoming webhook or Power Automate workflow.
//!
//! Legacy connectors take a MessageCard whose text is rendered as HTML, so the
//! message is escaped and line breaks become `<br />`. Workflow URLs take an
//! Adaptive Card, which renders plain text and needs no escaping.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use notifyhook_core::channel::{ChannelAdapter, ChannelKind};
use notifyhook_core::config::{TeamsMode, TeamsSettings};
use notifyhook_core::error::Result;
use notifyhook_core::transport::{OutboundRequest, Transport};

use super::Delivery;
use crate::transport::http::host_of;

pub struct TeamsChannel {
    settings: TeamsSettings,
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl TeamsChannel {
    pub fn new(settings: TeamsSettings, delivery: &Delivery) -> Self {
        Self {
            settings,
            transport: delivery.transport.clone(),
            timeout: delivery.timeout,
        }
    }

    /// Request body for the configured mode.
    pub fn payload(&self, message: &str) -> Value {
        match self.settings.mode {
            TeamsMode::Legacy => message_card(message),
            TeamsMode::Workflow => adaptive_card(message),
        }
    }
}

#[async_trait]
impl ChannelAdapter for TeamsChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Teams
    }

    async fn send(&self, message: &str) -> Result<()> {
        debug!(
            "Teams ({:?}) → {}",
            self.settings.mode,
            host_of(&self.settings.webhook_url)
        );
        let req = OutboundRequest::json(&self.settings.webhook_url, &self.payload(message))
            .timeout(self.timeout);
        self.transport.post(req).await?;
        Ok(())
    }
}

fn message_card(message: &str) -> Value {
    json!({
        "@type": "MessageCard",
        "@context": "http://schema.org/extensions",
        "themeColor": "0076D7",
        "summary": "Notification",
        "sections": [{
            "text": nl2br(&escape_html(message)),
        }],
    })
}

fn adaptive_card(message: &str) -> Value {
    json!({
        "type": "message",
        "attachments": [{
            "contentType": "application/vnd.microsoft.card.adaptive",
            "content": {
                "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
                "type": "AdaptiveCard",
                "version": "1.2",
                "body": [{
                    "type": "TextBlock",
                    "text": message,
                    "wrap": true,
                }],
            },
        }],
    })
}

/// Escape `& < > " '` for embedding in HTML.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Insert `<br />` before every line break, keeping the break itself.
/// `\r\n` and `\n\r` count as one break.
fn nl2br(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                out.push_str("<br />");
                out.push(c);
                let pair = if c == '\r' { '\n' } else { '\r' };
                if chars.peek() == Some(&pair) {
                    out.push(pair);
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeMailer, FakeTransport};

    fn channel(mode: TeamsMode, transport: &FakeTransport) -> TeamsChannel {
        let delivery = Delivery::new(Arc::new(transport.clone()), Arc::new(FakeMailer::new()));
        TeamsChannel::new(
            TeamsSettings {
                webhook_url: "https://teams.test/hook".into(),
                mode,
            },
            &delivery,
        )
    }

    #[test]
    fn test_escape_and_line_breaks() {
        assert_eq!(
            nl2br(&escape_html("<b>hi</b>\nthere")),
            "&lt;b&gt;hi&lt;/b&gt;<br />\nthere"
        );
        assert_eq!(escape_html(r#"a & "b" 'c'"#), "a &amp; &quot;b&quot; &#039;c&#039;");
        assert_eq!(nl2br("a\r\nb\n\rc\rd"), "a<br />\r\nb<br />\n\rc<br />\rd");
        assert_eq!(nl2br("a\n\nb"), "a<br />\n<br />\nb");
    }

    #[tokio::test]
    async fn test_legacy_card_escapes_markup() {
        let transport = FakeTransport::new();
        channel(TeamsMode::Legacy, &transport)
            .send("<b>hi</b>\nthere")
            .await
            .unwrap();

        let body = transport.last_json();
        assert_eq!(body["@type"], "MessageCard");
        let text = body["sections"][0]["text"].as_str().unwrap();
        assert_eq!(text, "&lt;b&gt;hi&lt;/b&gt;<br />\nthere");
        assert!(!text.contains("<b>"));
        assert_eq!(transport.urls(), ["https://teams.test/hook"]);
    }

    #[tokio::test]
    async fn test_workflow_adaptive_card() {
        let transport = FakeTransport::new();
        channel(TeamsMode::Workflow, &transport)
            .send("<b>hi</b>")
            .await
            .unwrap();

        let body = transport.last_json();
        assert_eq!(body["type"], "message");
        let attachment = &body["attachments"][0];
        assert_eq!(attachment["contentType"], "application/vnd.microsoft.card.adaptive");
        assert_eq!(attachment["content"]["type"], "AdaptiveCard");
        assert_eq!(attachment["content"]["body"][0]["text"], "<b>hi</b>");
        assert_eq!(attachment["content"]["body"][0]["wrap"], true);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = FakeTransport::new();
        transport.fail("https://teams.test/hook", "connection refused");
        let err = channel(TeamsMode::Legacy, &transport)
            .send("hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("https://teams.test/hook"));
    }

    #[tokio::test]
    async fn test_provider_error_status_still_counts_as_sent() {
        let transport = FakeTransport::new();
        transport.respond("https://teams.test/hook", 400, "Bad payload");
        assert!(channel(TeamsMode::Legacy, &transport).send("hi").await.is_ok());
    }
}
