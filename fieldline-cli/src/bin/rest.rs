//! REST binary entry point
//!
//! Connects to every configured integration and serves status, tool
//! invocation and the business context over HTTP.

use clap::Parser;
use fieldline_core::application::client::{ClientConfig, IntegrationClient};
use fieldline_core::config::AppConfig;
use fieldline_core::server;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "fieldline-rest", about = "Fieldline integration REST server")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// REST API bind address (overrides config if specified)
    #[arg(long)]
    bind: Option<String>,

    /// Serve mock data for every read regardless of peer health
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_tracing();
    info!("Starting fieldline REST server");

    let config_path = args.config.as_deref().map(Path::new);
    let mut file_config = AppConfig::load(config_path)?;
    if let Some(bind) = args.bind {
        file_config.rest_server.bind = bind;
    }
    debug!(
        peers = file_config.peers.len(),
        force_mock_data = file_config.force_mock_data,
        "Configuration loaded"
    );

    let mut client_config = ClientConfig::from(&file_config);
    if args.mock {
        client_config = client_config.with_force_mock_data(true);
    }
    let client = Arc::new(IntegrationClient::new(client_config));

    let summary = client.initialize().await;
    for (peer, reason) in &summary.failed {
        warn!(%peer, reason = reason.as_str(), "Integration unavailable, mock data will be served");
    }
    info!(
        registered = summary.registered.len(),
        failed = summary.failed.len(),
        "Integrations initialized"
    );

    let served = server::serve(client.clone(), &file_config.rest_server).await;
    client.disconnect().await;
    served?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}
