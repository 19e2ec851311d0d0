//! Recording fakes for the transport traits, shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use notifyhook_core::error::{RelayError, Result};
use notifyhook_core::transport::{MailMessage, Mailer, OutboundRequest, RawResponse, Transport};

/// Records every request and answers from a per-URL script.
///
/// Unscripted URLs get `200` with an empty body.
#[derive(Clone, Default)]
pub struct FakeTransport {
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
    responses: Arc<Mutex<HashMap<String, std::result::Result<RawResponse, String>>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            Ok(RawResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    /// Make every POST to `url` fail at the transport level.
    pub fn fail(&self, url: &str, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    pub fn last_json(&self) -> serde_json::Value {
        let last = self.requests().pop().expect("no request recorded");
        serde_json::from_str(&last.body).expect("body is not JSON")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn post(&self, request: OutboundRequest) -> Result<RawResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().get(&url) {
            Some(Ok(resp)) => Ok(resp.clone()),
            Some(Err(reason)) => Err(RelayError::Transport {
                url,
                reason: reason.clone(),
            }),
            None => Ok(RawResponse {
                status: 200,
                body: String::new(),
            }),
        }
    }
}

/// Records submitted mail; optionally refuses it.
#[derive(Clone, Default)]
pub struct FakeMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
    refuse: Option<String>,
    stall: bool,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing(reason: &str) -> Self {
        Self {
            refuse: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// A mailer whose submissions never complete.
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn submit(&self, message: MailMessage) -> Result<()> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = &self.refuse {
            return Err(RelayError::Mail(reason.clone()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
