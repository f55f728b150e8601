//! NSPIRE CRM — GoHighLevel HTTP client.
//!
//! This crate provides:
//! - Client configuration ([`CrmConfig`])
//! - The [`GhlClient`] implementation of
//!   [`CrmGateway`](nspire_core::gateway::CrmGateway), with a bounded
//!   per-call timeout and a single retry on timeout
//! - Error types ([`CrmError`])

mod client;
mod config;
mod error;

pub use client::GhlClient;
pub use config::CrmConfig;
pub use error::CrmError;
