//! Drive server: hierarchical folder and file storage over HTTP.
//!
//! Main entry point that loads configuration, installs logging and serves
//! the API until Ctrl-C.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use drive_core::config::AppConfig;
use drive_core::config::logging::LoggingConfig;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "drive-server", version, about = "Drive storage server")]
struct Args {
    /// Directory holding `default.toml` and the per-environment overlays.
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Environment overlay to load (`config/{env}.toml`).
    #[arg(long, env = "DRIVE_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_from(&args.config_dir, &args.env)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config_dir))?;

    init_logging(&config.logging);
    tracing::info!(env = %args.env, "Starting Drive v{}", env!("CARGO_PKG_VERSION"));

    run(config).await
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_address();

    let state = drive_api::build_state(config)
        .await
        .context("Failed to initialize backends")?;
    let database = state.database.clone();
    let app = drive_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Drive server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    tracing::info!("Drive server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
