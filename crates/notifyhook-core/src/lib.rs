//! # notifyhook core
//!
//! Shared types, traits, and protocols for the notifyhook relay.
//! The hub and the CLI both build on this crate.

pub mod auth;
pub mod channel;
pub mod config;
pub mod error;
pub mod message;
pub mod transport;
