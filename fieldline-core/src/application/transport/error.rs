use crate::domain::PeerId;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport to '{peer}' is not connected")]
    NotConnected { peer: PeerId },
    #[error("failed to spawn endpoint for '{peer}': {source}")]
    Spawn {
        peer: PeerId,
        #[source]
        source: std::io::Error,
    },
    #[error("endpoint '{peer}' transport error: {message}")]
    Transport { peer: PeerId, message: String },
    #[error("endpoint '{peer}' returned invalid JSON: {source}")]
    InvalidJson {
        peer: PeerId,
        #[source]
        source: serde_json::Error,
    },
    #[error("endpoint '{peer}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        peer: PeerId,
        code: i64,
        message: String,
    },
    #[error("endpoint '{peer}' terminated unexpectedly")]
    Terminated { peer: PeerId },
    #[error("request to '{peer}' timed out after {}ms", .after.as_millis())]
    Timeout { peer: PeerId, after: Duration },
    #[error("request to '{peer}' was cancelled")]
    Cancelled { peer: PeerId },
}

impl TransportError {
    pub fn peer(&self) -> PeerId {
        match self {
            TransportError::NotConnected { peer }
            | TransportError::Spawn { peer, .. }
            | TransportError::Transport { peer, .. }
            | TransportError::InvalidJson { peer, .. }
            | TransportError::Rpc { peer, .. }
            | TransportError::Terminated { peer }
            | TransportError::Timeout { peer, .. }
            | TransportError::Cancelled { peer } => *peer,
        }
    }

    /// The session is gone, as opposed to one request going wrong.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            TransportError::NotConnected { .. } | TransportError::Terminated { .. }
        )
    }
}
