//! Dispatcher: fans one notification out to its target channels.
//!
//! Adapters are built once, when the dispatcher is created, from the
//! registry's enabled channels. Each dispatch resolves its targets, runs every
//! target concurrently with its own outcome slot, and folds the outcomes into
//! a [`DispatchReport`]. Channel failures never escape as errors; only a blank
//! message does.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use notifyhook_core::channel::ChannelAdapter;
use notifyhook_core::config::{ChannelRegistry, RelayConfig};
use notifyhook_core::error::{RelayError, Result};
use notifyhook_core::message::{DispatchOutcome, DispatchReport, NotificationRequest};

use crate::channels::{Delivery, adapter_for};
use crate::transport::{HttpTransport, SendmailMailer};

pub struct Dispatcher {
    registry: ChannelRegistry,
    adapters: HashMap<String, Arc<dyn ChannelAdapter>>,
}

impl Dispatcher {
    /// Build adapters for every enabled channel in `registry`.
    pub fn new(registry: ChannelRegistry, delivery: Delivery) -> Self {
        let mut adapters = HashMap::new();
        for (name, config) in registry.iter().filter(|(_, c)| c.enabled) {
            match adapter_for(&config.settings, &delivery) {
                Some(adapter) => {
                    debug!("Registered channel: {} ({})", name, adapter.kind());
                    adapters.insert(name.to_string(), adapter);
                }
                None => warn!("Channel {} has no adapter; sends to it will fail", name),
            }
        }
        Self { registry, adapters }
    }

    /// Dispatcher wired to the real HTTP transport and sendmail.
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let timeout = config.transport.timeout();
        let delivery = Delivery::new(
            Arc::new(HttpTransport::with_timeout(timeout)?),
            Arc::new(SendmailMailer::new(config.transport.sendmail_path.clone())),
        )
        .with_timeout(timeout);
        Ok(Self::new(config.channels.clone(), delivery))
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Names of enabled channels, in configuration order.
    pub fn enabled_channels(&self) -> Vec<String> {
        self.registry.enabled_names()
    }

    /// Send `request` to its target channels and report per-channel outcomes.
    ///
    /// Fails only when the message is blank, before any channel is touched.
    pub async fn dispatch(&self, request: &NotificationRequest) -> Result<DispatchReport> {
        let message = request.validated_message()?;
        let targets = match &request.channel {
            Some(name) => vec![name.clone()],
            None => self.registry.enabled_names(),
        };

        let span = info_span!("dispatch", id = %Uuid::new_v4());
        async move {
            info!("Dispatching to {} channel(s): {:?}", targets.len(), targets);

            let outcomes = join_all(
                targets
                    .iter()
                    .map(|name| async move { (name, self.dispatch_one(name, message).await) }),
            )
            .await;

            let mut report = DispatchReport::new();
            for (name, outcome) in outcomes {
                report.record(name, outcome);
            }

            if report.is_success() {
                info!(
                    "Sent to {:?}, {} failed",
                    report.sent(),
                    report.errors().len()
                );
            } else if !targets.is_empty() {
                error!("All {} channel(s) failed", targets.len());
            } else {
                warn!("No enabled channels to dispatch to");
            }
            Ok(report)
        }
        .instrument(span)
        .await
    }

    async fn dispatch_one(&self, name: &str, message: &str) -> DispatchOutcome {
        if self.registry.enabled(name).is_none() {
            warn!("Channel {}: not found or disabled", name);
            return DispatchOutcome::Failed(RelayError::ChannelUnavailable.to_string());
        }
        let Some(adapter) = self.adapters.get(name) else {
            warn!("Channel {}: unknown kind", name);
            return DispatchOutcome::Failed(RelayError::UnknownChannel(name.to_string()).to_string());
        };

        match adapter.send(message).await {
            Ok(()) => {
                debug!("Channel {} sent", name);
                DispatchOutcome::Sent
            }
            Err(e) => {
                warn!("Channel {} failed: {}", name, e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
