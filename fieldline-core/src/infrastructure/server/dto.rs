use crate::application::aggregator::CallerContext;
use crate::application::client::{ClientError, DisconnectReport, InitSummary};
use crate::domain::{IntegrationStatus, PeerId, PeerStatus, ToolDescriptor};
use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn client_error(err: &ClientError) -> ApiError {
    let status = match err {
        ClientError::PeerUnavailable { .. } | ClientError::Cancelled { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ClientError::ToolError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ClientError::Transport(_) | ClientError::Parse { .. } => StatusCode::BAD_GATEWAY,
    };
    api_error(status, err.user_message())
}

pub(crate) fn parse_peer(raw: &str) -> Result<PeerId, ApiError> {
    raw.parse()
        .map_err(|err: crate::domain::UnknownPeer| api_error(StatusCode::BAD_REQUEST, err.to_string()))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(value_type = Object)]
    pub integrations: BTreeMap<PeerId, PeerStatus>,
    pub connected: usize,
}

impl From<IntegrationStatus> for StatusResponse {
    fn from(status: IntegrationStatus) -> Self {
        Self {
            connected: status.connected_count(),
            integrations: status
                .iter()
                .map(|(peer, status)| (*peer, status.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub disconnected: DisconnectReport,
    pub initialized: InitSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToolListResponse {
    pub peer: PeerId,
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContextRequest {
    /// Message the user just sent, if any.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub context: CallerContext,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendSmsRequest {
    pub to: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendResponse {
    #[schema(value_type = Object)]
    pub result: Value,
}
