//! Stdio tool endpoint entry point
//!
//! Serves one business integration over newline-delimited JSON-RPC on
//! stdin/stdout. Logs go to stderr so they never interleave with protocol
//! frames.

use clap::Parser;
use fieldline_core::config::ensure_env_loaded;
use fieldline_core::domain::PeerId;
use fieldline_core::endpoints;
use fieldline_core::rpc::RpcDispatcher;
use std::error::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "fieldline-endpoint", about = "Fieldline stdio tool endpoint")]
struct Args {
    /// Integration to serve: scheduling, accounting, email or messaging
    #[arg(long)]
    peer: PeerId,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_tracing();
    ensure_env_loaded();

    let endpoint = endpoints::from_env(args.peer);
    info!(
        peer = %args.peer,
        tool_count = endpoint.tools().len(),
        "Tool endpoint serving on stdio"
    );
    RpcDispatcher::new(endpoint).serve_stdio().await?;
    info!(peer = %args.peer, "Input closed, endpoint exiting");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}
