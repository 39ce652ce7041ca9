//! Observation API server.
//!
//! Serves the current weather reading from a configurable primary feed with
//! a public NWS fallback, plus the static UI that polls it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use obs_api::config::ObsConfig;
use obs_api::server;
use obs_api::state::AppState;

/// Observation API server
#[derive(Parser, Debug)]
#[command(name = "obs-api")]
#[command(about = "Current-conditions observation server with provider fallback")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000", env = "OBS_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Directory of static UI assets
    #[arg(long, default_value = "public", env = "OBS_PUBLIC_DIR")]
    public_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting observation API server");

    let config = ObsConfig::from_env();
    info!(
        primary_configured = config.primary_configured(),
        nws_base = %config.nws_base,
        "Loaded configuration"
    );

    let state = Arc::new(AppState::new(config)?);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    server::start_server(state, addr, args.public_dir).await
}
