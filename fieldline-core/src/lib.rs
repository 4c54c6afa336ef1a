//! Integration protocol layer for a field-service business assistant.
//!
//! Four business systems (scheduling, accounting, email and messaging) are
//! exposed as tool endpoints speaking JSON-RPC. An [`IntegrationClient`]
//! keeps a session with each of them, and a [`ContextAggregator`] fans out
//! across all four to build one business snapshot.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::aggregator::{BusinessContext, CallerContext, ContextAggregator, Intent};
pub use application::cancel::CancelToken;
pub use application::client::{ClientConfig, ClientError, IntegrationClient, ToolOutcome};
pub use application::endpoint::ToolEndpoint;
pub use application::transport::{Transport, TransportError};
pub use config::AppConfig;
pub use domain::{IntegrationStatus, PeerId, Provenance};
pub use infrastructure::{endpoints, rpc};
#[cfg(feature = "rest")]
pub use infrastructure::server;
