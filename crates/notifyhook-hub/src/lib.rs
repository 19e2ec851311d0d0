//! # notifyhook hub
//!
//! The working relay: HTTP and sendmail transports, one channel adapter per
//! provider (Teams, Telegram, Slack, Discord, ntfy, email), the fan-out
//! dispatcher, and the axum server that fronts it.

pub mod api;
pub mod channels;
pub mod dispatcher;
pub mod middleware;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::Dispatcher;
