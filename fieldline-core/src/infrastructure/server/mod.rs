//! HTTP surface over the integration client and the context aggregator.

mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use error::ServerError;

use crate::application::client::IntegrationClient;
use crate::config::RestServerConfig;
use axum::Router;
use std::sync::Arc;

pub async fn serve(
    client: Arc<IntegrationClient>,
    config: &RestServerConfig,
) -> Result<(), ServerError> {
    router::serve(client, config).await
}

/// The application router, for embedding in another server.
pub fn router(client: Arc<IntegrationClient>, config: &RestServerConfig) -> Router {
    router::build(client, &config.cors_origins)
}
