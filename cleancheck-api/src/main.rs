//! CleanCheck API - Main entry point
//!
//! HTTP service that grades cleaning photos with a vision model and keeps
//! an in-memory inspection history for admin and staff users.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cleancheck_api::config::{resolve_port, resolve_vision_api_key};
use cleancheck_api::services::OpenAiVisionClient;
use cleancheck_api::{build_router, AppState};
use cleancheck_common::config::{default_config_path, load_toml_config};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cleancheck-api
#[derive(Parser, Debug)]
#[command(name = "cleancheck-api")]
#[command(about = "AI cleaning inspection API")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, default_value = "0.0.0.0", env = "CLEANCHECK_BIND")]
    bind: IpAddr,

    /// TOML config file (defaults to <config_dir>/cleancheck/config.toml)
    #[arg(short, long, env = "CLEANCHECK_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config =
        load_toml_config(config_path.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "cleancheck_api={level},cleancheck_common={level},tower_http=info",
                    level = toml_config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting CleanCheck API v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: none (built-in defaults)"),
    }

    let api_key = resolve_vision_api_key(&toml_config.vision);
    let vision = OpenAiVisionClient::new(&toml_config.vision, api_key)
        .context("Failed to initialize vision client")?;
    info!(
        "Vision model: {} via {}",
        toml_config.vision.model, toml_config.vision.base_url
    );

    let state = AppState::new(Arc::new(vision));
    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, resolve_port(args.port, &toml_config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("cleancheck-api listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
