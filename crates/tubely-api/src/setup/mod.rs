//! Application setup and initialization
//!
//! Builds the record store, one storage backend per upload flow, the shared state
//! and the router from a validated `Config`.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::JwtVerifier;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let videos = database::setup_repository(&config).await?;
    let (thumbnails, video_storage) = storage::setup_storage(&config).await?;

    tokio::fs::create_dir_all(&config.upload_temp_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload temp dir {}",
                config.upload_temp_dir.display()
            )
        })?;

    let identity = Arc::new(JwtVerifier::new(config.jwt_secret.clone()));
    let state = Arc::new(AppState::new(
        config.clone(),
        videos,
        identity,
        thumbnails,
        video_storage,
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
