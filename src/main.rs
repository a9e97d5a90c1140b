//! Chatdesk Server: single-session presence and session-lock coordinator.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use chatdesk_core::config::AppConfig;
use chatdesk_core::types::BootEpoch;
use chatdesk_database::Stores;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Captured before anything else so every credential issued by this
    // run is at or after it.
    let boot = BootEpoch::capture();

    let env = std::env::var("CHATDESK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("Failed to load configuration")?;

    init_logging(&config);
    tracing::info!(env = %env, boot = boot.as_secs(), "Starting Chatdesk v{}", env!("CARGO_PKG_VERSION"));

    run(config, boot).await
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
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
async fn run(config: AppConfig, boot: BootEpoch) -> anyhow::Result<()> {
    tracing::info!(provider = ?config.database.provider, "Opening store...");
    let stores = Stores::open(&config.database)
        .await
        .context("Failed to open store")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = chatdesk_api::build_state(config, stores.clone(), boot);
    let realtime = state.realtime.clone();
    let app = chatdesk_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Chatdesk server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, closing connections...");
        realtime.shutdown();
    })
    .await
    .context("Server error")?;

    stores.close().await;
    tracing::info!("Chatdesk server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
