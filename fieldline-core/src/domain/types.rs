use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// One of the four external systems sitting behind a tool endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PeerId {
    Scheduling,
    Accounting,
    Email,
    Messaging,
}

impl PeerId {
    pub const ALL: [PeerId; 4] = [
        PeerId::Scheduling,
        PeerId::Accounting,
        PeerId::Email,
        PeerId::Messaging,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeerId::Scheduling => "scheduling",
            PeerId::Accounting => "accounting",
            PeerId::Email => "email",
            PeerId::Messaging => "messaging",
        }
    }

    /// Name the endpoint announces in its `initialize` response.
    pub fn server_name(self) -> &'static str {
        match self {
            PeerId::Scheduling => "scheduling-server",
            PeerId::Accounting => "accounting-server",
            PeerId::Email => "email-server",
            PeerId::Messaging => "messaging-server",
        }
    }

    /// Environment variable holding the endpoint executable for this peer.
    pub fn server_path_env(self) -> String {
        format!(
            "{}_{}_SERVER_PATH",
            crate::constants::ENV_PREFIX,
            self.as_str().to_ascii_uppercase()
        )
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown peer '{0}' (expected scheduling, accounting, email or messaging)")]
pub struct UnknownPeer(pub String);

impl FromStr for PeerId {
    type Err = UnknownPeer;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduling" => Ok(PeerId::Scheduling),
            "accounting" => Ok(PeerId::Accounting),
            "email" => Ok(PeerId::Email),
            "messaging" => Ok(PeerId::Messaging),
            other => Err(UnknownPeer(other.to_string())),
        }
    }
}

/// Static description of one tool, as returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    #[schema(value_type = Object)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

/// Result envelope of a `tools/call` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

/// The payload of a [`ToolResult`] could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("tool reported an error: {0}")]
    ToolError(String),
    #[error("tool result has no text content")]
    Empty,
    #[error("tool result is not valid JSON: {0}")]
    InvalidJson(String),
}

impl ToolResult {
    /// Successful result carrying a serialized JSON document.
    pub fn json(payload: &Value) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: payload.to_string(),
            }],
            is_error: false,
        }
    }

    /// Failed result with a human-readable explanation.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Failed result whose explanation is itself a JSON document.
    pub fn error_json(details: &Value) -> Self {
        Self::error(details.to_string())
    }

    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
        })
    }

    /// Parses the first text block. Errors and unparseable content are both failures.
    pub fn payload(&self) -> Result<Value, ParseFailure> {
        let text = self.text().ok_or(ParseFailure::Empty)?;
        if self.is_error {
            return Err(ParseFailure::ToolError(text.to_string()));
        }
        serde_json::from_str(text).map_err(|err| ParseFailure::InvalidJson(err.to_string()))
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Real,
    Mock,
}

impl Provenance {
    /// Substituted payloads carry a `note` or `"source": "mock"` marker.
    pub fn detect(payload: &Value) -> Self {
        let Some(map) = payload.as_object() else {
            return Provenance::Real;
        };
        let tagged = map.get("source").and_then(Value::as_str) == Some("mock");
        if tagged || map.contains_key("note") {
            Provenance::Mock
        } else {
            Provenance::Real
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PeerStatus {
    pub status: ConnectionState,
    #[serde(rename = "lastSync")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_sync: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl PeerStatus {
    pub fn connected(at: DateTime<Utc>) -> Self {
        Self {
            status: ConnectionState::Connected,
            last_sync: Some(at),
            error: None,
        }
    }

    pub fn disconnected(error: Option<String>) -> Self {
        Self {
            status: ConnectionState::Disconnected,
            last_sync: None,
            error,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ConnectionState::Error,
            last_sync: None,
            error: Some(error.into()),
        }
    }
}

/// Health of every peer, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationStatus {
    peers: BTreeMap<PeerId, PeerStatus>,
}

impl IntegrationStatus {
    pub fn new(peers: BTreeMap<PeerId, PeerStatus>) -> Self {
        Self { peers }
    }

    pub fn get(&self, peer: PeerId) -> Option<&PeerStatus> {
        self.peers.get(&peer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeerId, &PeerStatus)> {
        self.peers.iter()
    }

    pub fn connected_count(&self) -> usize {
        self.peers
            .values()
            .filter(|status| status.status == ConnectionState::Connected)
            .count()
    }
}
