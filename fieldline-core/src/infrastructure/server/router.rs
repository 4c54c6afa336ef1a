use super::docs::ApiDoc;
use super::error::ServerError;
use super::routes;
use super::state::ServerState;
use crate::application::client::IntegrationClient;
use crate::config::RestServerConfig;
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(super) fn build(client: Arc<IntegrationClient>, cors_origins: &[String]) -> Router {
    let api = ApiDoc::openapi();

    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(origin = origin.as_str(), %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let state = Arc::new(ServerState::new(client));
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", api))
        .route("/integrations/status", get(routes::integrations::status_handler))
        .route("/integrations/refresh", post(routes::integrations::refresh_handler))
        .route("/tools/{peer}", get(routes::tools::list_handler))
        .route("/tools/{peer}/{tool}", post(routes::tools::invoke_handler))
        .route("/context", post(routes::context::context_handler))
        .route("/actions/email", post(routes::context::send_email_handler))
        .route("/actions/sms", post(routes::context::send_sms_handler))
        .layer(cors)
        .with_state(state)
}

pub(super) async fn serve(
    client: Arc<IntegrationClient>,
    config: &RestServerConfig,
) -> Result<(), ServerError> {
    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|source| ServerError::InvalidAddress {
            addr: config.bind.clone(),
            source,
        })?;
    info!(%addr, "Binding REST server");
    let app = build(client, &config.cors_origins);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
