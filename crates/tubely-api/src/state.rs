use std::sync::Arc;

use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_storage::{ConfiguredStorage, MemoryStorage, Storage};

use crate::auth::IdentityVerifier;
use crate::services::upload::{UploadFlow, UploadPipeline};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub uploads: UploadPipeline,
    pub thumbnail_flow: UploadFlow,
    pub video_flow: UploadFlow,
    /// Set when thumbnails are kept in the in-process cache.
    pub thumbnail_cache: Option<Arc<MemoryStorage>>,
}

impl AppState {
    pub fn new(
        config: Config,
        videos: Arc<dyn VideoRepository>,
        identity: Arc<dyn IdentityVerifier>,
        thumbnails: ConfiguredStorage,
        video_storage: ConfiguredStorage,
    ) -> Self {
        let uploads = UploadPipeline::new(identity, videos.clone(), config.upload_temp_dir.clone());
        let thumbnail_flow = UploadFlow::thumbnail(&config, thumbnails.storage);
        let video_flow = UploadFlow::video(&config, video_storage.storage);

        Self {
            config,
            videos,
            uploads,
            thumbnail_flow,
            video_flow,
            thumbnail_cache: thumbnails.cache,
        }
    }

    /// Every backend in use, for lifecycle management.
    pub fn storages(&self) -> [Arc<dyn Storage>; 2] {
        [
            self.thumbnail_flow.storage.clone(),
            self.video_flow.storage.clone(),
        ]
    }
}
