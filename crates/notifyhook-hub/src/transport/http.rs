//! HTTP transport: one POST per call via reqwest, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use notifyhook_core::error::{RelayError, Result};
use notifyhook_core::transport::{DEFAULT_TIMEOUT, OutboundRequest, RawResponse, Transport};

/// reqwest-backed [`Transport`]. Certificates are always verified.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Client-wide timeout. Each request may still carry its own.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("notifyhook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Config(format!("HTTP client error: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: OutboundRequest) -> Result<RawResponse> {
        let OutboundRequest {
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self.client.post(&url).timeout(timeout).body(body);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| RelayError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| RelayError::Transport {
            url: url.clone(),
            reason: format!("failed to read response body: {}", e),
        })?;

        let raw = RawResponse { status, body };
        if raw.is_success_status() {
            debug!("POST {} → {}", host_of(&url), status);
        } else {
            warn!(
                "POST {} → {} (not treated as a transport failure)",
                host_of(&url),
                status
            );
        }
        Ok(raw)
    }
}

/// Host part of a URL, for logs that must not leak tokens in paths.
pub(crate) fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "<invalid url>".to_string())
}
