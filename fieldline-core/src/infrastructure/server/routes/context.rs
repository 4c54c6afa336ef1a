use super::super::dto::{
    ApiError, ContextRequest, ErrorResponse, SendEmailRequest, SendResponse, SendSmsRequest,
    api_error, client_error,
};
use super::super::state::ServerState;
use crate::application::aggregator::BusinessContext;
use crate::application::cancel::CancelToken;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/context",
    tag = "context",
    request_body = ContextRequest,
    responses(
        (status = 200, description = "Snapshot across all integrations", body = BusinessContext)
    )
)]
pub async fn context_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ContextRequest>,
) -> Json<BusinessContext> {
    let cancel = CancelToken::new();
    // Dropping the handler (client went away) stops the outstanding reads.
    let _guard = CancelOnDrop(cancel.clone());
    let context = state
        .aggregator()
        .build_context(&request.context, request.message.as_deref(), Some(&cancel))
        .await;
    info!(
        intent = ?context.intent,
        errors = context.errors.len(),
        "Business context built"
    );
    Json(context)
}

struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[utoipa::path(
    post,
    path = "/actions/email",
    tag = "actions",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Email handed to the email integration", body = SendResponse),
        (status = 400, description = "Missing recipient", body = ErrorResponse),
        (status = 503, description = "Email integration not connected", body = ErrorResponse)
    )
)]
pub async fn send_email_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    if request.to.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "recipient cannot be empty"));
    }
    let result = state
        .client()
        .send_email(&request.to, &request.subject, &request.body, None)
        .await
        .map_err(|err| {
            error!(%err, "Failed to send email");
            client_error(&err)
        })?;
    Ok(Json(SendResponse { result }))
}

#[utoipa::path(
    post,
    path = "/actions/sms",
    tag = "actions",
    request_body = SendSmsRequest,
    responses(
        (status = 200, description = "Message handed to the messaging integration", body = SendResponse),
        (status = 400, description = "Missing recipient", body = ErrorResponse),
        (status = 503, description = "Messaging integration not connected", body = ErrorResponse)
    )
)]
pub async fn send_sms_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SendSmsRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    if request.to.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "recipient cannot be empty"));
    }
    let result = state
        .client()
        .send_sms(&request.to, &request.message, None)
        .await
        .map_err(|err| {
            error!(%err, "Failed to send SMS");
            client_error(&err)
        })?;
    Ok(Json(SendResponse { result }))
}
