use super::super::dto::{RefreshResponse, StatusResponse};
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::{debug, info};

#[utoipa::path(
    get,
    path = "/integrations/status",
    tag = "integrations",
    responses(
        (status = 200, description = "Connection state of every peer", body = StatusResponse)
    )
)]
pub async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    let status = state.client().status().await;
    debug!(connected = status.connected_count(), "Serving /integrations/status request");
    Json(StatusResponse::from(status))
}

#[utoipa::path(
    post,
    path = "/integrations/refresh",
    tag = "integrations",
    responses(
        (status = 200, description = "All sessions closed and re-established", body = RefreshResponse)
    )
)]
pub async fn refresh_handler(State(state): State<Arc<ServerState>>) -> Json<RefreshResponse> {
    let client = state.client();
    let disconnected = client.disconnect().await;
    let initialized = client.initialize().await;
    info!(
        registered = initialized.registered.len(),
        failed = initialized.failed.len(),
        "Integrations refreshed"
    );
    Json(RefreshResponse {
        disconnected,
        initialized,
    })
}
