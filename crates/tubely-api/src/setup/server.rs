//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tubely_core::Config;

use crate::state::AppState;

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router, state: Arc<AppState>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        environment = %config.environment,
        thumbnail_max_bytes = config.thumbnail_max_bytes,
        video_max_bytes = config.video_max_bytes,
        thumbnail_types = %config.thumbnail_allowed_content_types.join(","),
        video_types = %config.video_allowed_content_types.join(","),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_storages(&state).await;

    Ok(())
}

/// Release every backend's resources once no more requests are in flight.
pub async fn close_storages(state: &AppState) {
    for storage in state.storages() {
        let backend = storage.backend_type();
        match storage.close().await {
            Ok(()) => tracing::debug!(backend = %backend, "Storage closed"),
            Err(e) => tracing::warn!(backend = %backend, error = %e, "Failed to close storage"),
        }
    }
}

/// Signal handler for graceful shutdown
///
/// Listens for Ctrl+C (SIGINT) and SIGTERM signals to initiate graceful shutdown.
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
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
