//! filestore — minimal object storage server
//!
//! Usage:
//!   filestore serve                        # defaults, storage in ./storage
//!   filestore serve --config config.toml   # PORT env still overrides api.port
//!   filestore check --config config.toml   # validate and print config

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use filestore::api::{self, AppState};
use filestore::config::Config;
use filestore::storage::{prepare_root, LocalStorage};

#[derive(Parser)]
#[command(name = "filestore", about = "Minimal object storage server", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prepare the storage directory and serve the HTTP API.
    Serve {
        /// Path to the TOML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load and validate the configuration, print it and exit.
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Serve { config } => run_serve(config).await,
        Command::Check { config } => run_check(config),
    };

    if let Err(e) = outcome {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run_serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let cfg = Config::load(config_path.as_deref()).context("Failed to load config")?;

    info!(
        root = ?cfg.storage.root,
        reset = cfg.storage.reset_on_start,
        addr = cfg.api.addr(),
        "Starting object storage"
    );

    prepare_root(&cfg.storage.root, cfg.storage.reset_on_start)
        .context("Failed to prepare storage root")?;

    let storage = Arc::new(LocalStorage::open(cfg.storage.root.clone()));
    let state = AppState::new(storage);

    api::start_server(state, &cfg.api, shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

fn run_check(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let cfg = Config::load(config_path.as_deref()).context("Invalid config")?;

    println!("=== filestore config ===");
    println!("Storage root   : {}", cfg.storage.root.display());
    println!("Reset on start : {}", cfg.storage.reset_on_start);
    println!("Listen address : {}", cfg.api.addr());
    println!("Max upload     : {} MB", cfg.api.max_upload_mb);
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received CTRL+C, shutting down…"),
        Err(e) => error!(error = %e, "Signal error"),
    }
}
