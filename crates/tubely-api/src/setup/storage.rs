//! Storage setup and initialization

use anyhow::{Context, Result};
use tubely_core::Config;
use tubely_storage::{create_storage, ConfiguredStorage};

/// Create the thumbnail and video backends.
pub async fn setup_storage(config: &Config) -> Result<(ConfiguredStorage, ConfiguredStorage)> {
    let thumbnails = create_storage(config.thumbnail_storage_backend, config)
        .await
        .context("Failed to initialize thumbnail storage")?;
    let videos = create_storage(config.video_storage_backend, config)
        .await
        .context("Failed to initialize video storage")?;

    tracing::info!(
        thumbnail_backend = %thumbnails.storage.backend_type(),
        video_backend = %videos.storage.backend_type(),
        assets_root = %config.assets_root.display(),
        "Storage initialized"
    );

    Ok((thumbnails, videos))
}
