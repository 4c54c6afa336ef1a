use crate::application::transport::TransportError;
use crate::domain::PeerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("peer '{peer}' is unavailable: {reason}")]
    PeerUnavailable { peer: PeerId, reason: String },
    #[error(transparent)]
    Transport(TransportError),
    #[error("{peer} tool '{tool}' reported an error: {message}")]
    ToolError {
        peer: PeerId,
        tool: String,
        message: String,
    },
    #[error("{peer} tool '{tool}' returned an unusable result: {reason}")]
    Parse {
        peer: PeerId,
        tool: String,
        reason: String,
    },
    #[error("request to '{peer}' was cancelled")]
    Cancelled { peer: PeerId },
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled { peer } => ClientError::Cancelled { peer },
            err if err.is_disconnect() => ClientError::PeerUnavailable {
                peer: err.peer(),
                reason: err.to_string(),
            },
            err => ClientError::Transport(err),
        }
    }
}

impl ClientError {
    pub fn peer(&self) -> PeerId {
        match self {
            ClientError::PeerUnavailable { peer, .. }
            | ClientError::ToolError { peer, .. }
            | ClientError::Parse { peer, .. }
            | ClientError::Cancelled { peer } => *peer,
            ClientError::Transport(err) => err.peer(),
        }
    }

    /// Text safe to show in the dashboard.
    pub fn user_message(&self) -> String {
        let peer = self.peer();
        match self {
            ClientError::PeerUnavailable { .. } => {
                format!("The {peer} integration is not connected. Showing sample data instead.")
            }
            ClientError::Transport(TransportError::Timeout { .. }) => {
                format!("The {peer} integration took too long to respond. Try again shortly.")
            }
            ClientError::Transport(_) => {
                format!("Could not reach the {peer} integration. Try again shortly.")
            }
            ClientError::ToolError { tool, .. } => {
                format!("The {peer} integration rejected the '{tool}' request.")
            }
            ClientError::Parse { .. } => {
                format!("The {peer} integration returned data that could not be read.")
            }
            ClientError::Cancelled { .. } => "The request was cancelled.".to_string(),
        }
    }
}
