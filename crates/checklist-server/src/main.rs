//! checklist-server - REST API server binary.

use std::net::SocketAddr;

use checklist_core::config::ChecklistConfig;
use checklist_server::{create_server, AppState};
use tokio::signal;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

/// Load config from `CHECKLIST_CONFIG` when set, then apply environment overrides.
fn load_config() -> Result<ChecklistConfig, Box<dyn std::error::Error>> {
    match std::env::var("CHECKLIST_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            let mut config = ChecklistConfig::from_file(&path)?;
            config.apply_env();
            info!(path = %path, "Loaded configuration file");
            Ok(config)
        }
        _ => Ok(ChecklistConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("checklist_server=debug".parse()?),
        )
        .init();

    // Get configuration from environment
    let host = std::env::var("CHECKLIST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("CHECKLIST_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .map_err(|e| format!("CHECKLIST_PORT must be a valid port number: {}", e))?;

    let config = load_config()?;
    info!(mode = %config.extraction.mode, "Extraction configured");
    let state = AppState::from_config(config)?;
    let app = create_server(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting checklist-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
