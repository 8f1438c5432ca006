//! xuanji-oracle - BaZi chart and feng shui service
//!
//! Serves deterministic Four Pillars charts and Flying Star grids, and
//! annotates them with narratives from a remote model.
//!
//! Default address: 127.0.0.1:5780

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use xuanji_common::logging::init_tracing;
use xuanji_oracle::config::TomlConfig;
use xuanji_oracle::inference::{GeminiClient, InferenceClient};
use xuanji_oracle::{build_router, AppState};

/// Command-line arguments for xuanji-oracle
#[derive(Parser, Debug)]
#[command(name = "xuanji-oracle")]
#[command(about = "BaZi chart, Flying Star and horoscope service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "XUANJI_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "XUANJI_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "XUANJI_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so the file can set the log level
    let (config, config_path) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging).context("Failed to initialize tracing")?;

    info!(
        "Starting xuanji-oracle v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file; using defaults"),
    }

    let client = GeminiClient::new(config.gemini_settings()).context("Failed to build Gemini client")?;
    if !client.has_credential() {
        warn!("Generation endpoints disabled until an API key is configured");
    }
    let client: Arc<dyn InferenceClient> = Arc::new(client);

    info!(
        true_solar_time = config.chart.true_solar_time,
        zi_hour_mode = ?config.chart.zi_hour_mode,
        "Chart options"
    );
    let state = AppState::new(client, config.chart);
    let app = build_router(state);

    let host = config.bind_host(args.host);
    let port = config.bind_port(args.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
