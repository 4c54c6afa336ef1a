//! # Transports
//!
//! Point-to-point channels from the client to one endpoint. A transport owns
//! its connection lifecycle: `connect` performs the protocol handshake and
//! caches the tool catalog, `request` sends one JSON-RPC request and waits for
//! its response, `close` tears the channel down. Requests issued while
//! disconnected fail with [`TransportError::NotConnected`].
//!
//! Every request is bounded by [`CallOptions`]: a timeout and an optional
//! [`CancelToken`].

mod error;
mod factory;
mod in_process;
#[cfg(feature = "native-transport")]
mod process;

pub use error::TransportError;
pub use factory::{DefaultTransportFactory, TransportFactory};
pub use in_process::InProcessTransport;
#[cfg(feature = "native-transport")]
pub use process::ProcessTransport;

use super::cancel::CancelToken;
use crate::constants::PROTOCOL_VERSION;
use crate::domain::{PeerId, ToolDescriptor};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    fn peer(&self) -> PeerId;

    /// Opens the channel and completes the handshake. Connecting an open
    /// transport is a no-op.
    async fn connect(&self, options: &CallOptions) -> Result<(), TransportError>;

    /// Sends one request and returns the `result` member of its response.
    async fn request(
        &self,
        method: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<Value, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    /// Catalog received during the handshake.
    async fn tools(&self) -> Vec<ToolDescriptor>;
}

#[derive(Debug, Clone)]
pub struct CallOptions {
    pub timeout: Duration,
    pub cancel: Option<CancelToken>,
}

impl CallOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Runs `work` under the timeout and cancellation token of `options`.
pub(crate) async fn bounded<T, F>(
    peer: PeerId,
    options: &CallOptions,
    work: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    let timed = async {
        match tokio::time::timeout(options.timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                peer,
                after: options.timeout,
            }),
        }
    };

    match &options.cancel {
        Some(token) => {
            if token.is_cancelled() {
                return Err(TransportError::Cancelled { peer });
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(TransportError::Cancelled { peer }),
                result = timed => result,
            }
        }
        None => timed.await,
    }
}

pub(crate) fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "clientInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {}
    })
}

/// Reads the `tools` array of a `tools/list` result, skipping malformed entries.
pub(crate) fn parse_catalog(result: &Value) -> Vec<ToolDescriptor> {
    result
        .get("tools")
        .and_then(Value::as_array)
        .map(|tools| {
            tools
                .iter()
                .filter_map(|tool| serde_json::from_value(tool.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
