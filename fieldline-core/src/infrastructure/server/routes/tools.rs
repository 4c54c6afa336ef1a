use super::super::dto::{ApiError, ErrorResponse, ToolListResponse, client_error, parse_peer};
use super::super::state::ServerState;
use crate::application::client::ToolOutcome;
use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[utoipa::path(
    get,
    path = "/tools/{peer}",
    tag = "tools",
    params(("peer" = String, Path, description = "scheduling, accounting, email or messaging")),
    responses(
        (status = 200, description = "Tool catalog of the peer", body = ToolListResponse),
        (status = 400, description = "Unknown peer", body = ErrorResponse),
        (status = 503, description = "Peer is not connected", body = ErrorResponse)
    )
)]
pub async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Path(peer): Path<String>,
) -> Result<Json<ToolListResponse>, ApiError> {
    let peer = parse_peer(&peer)?;
    let tools = state
        .client()
        .list_tools(peer)
        .await
        .map_err(|err| client_error(&err))?;
    debug!(%peer, tool_count = tools.len(), "Serving /tools request");
    Ok(Json(ToolListResponse { peer, tools }))
}

#[utoipa::path(
    post,
    path = "/tools/{peer}/{tool}",
    tag = "tools",
    params(
        ("peer" = String, Path, description = "scheduling, accounting, email or messaging"),
        ("tool" = String, Path, description = "Tool name from the peer's catalog")
    ),
    request_body(content = Object, description = "Tool arguments"),
    responses(
        (status = 200, description = "Live or substituted payload with its provenance", body = ToolOutcome),
        (status = 400, description = "Unknown peer", body = ErrorResponse)
    )
)]
pub async fn invoke_handler(
    State(state): State<Arc<ServerState>>,
    Path((peer, tool)): Path<(String, String)>,
    Json(arguments): Json<Value>,
) -> Result<Json<ToolOutcome>, ApiError> {
    let peer = parse_peer(&peer)?;
    info!(%peer, tool = tool.as_str(), "Received tool invocation");
    let outcome = state
        .client()
        .invoke_or_fallback(peer, &tool, arguments, None)
        .await;
    Ok(Json(outcome))
}
