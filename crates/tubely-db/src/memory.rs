//! Process-local record store, used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tubely_core::{AppError, Video};
use uuid::Uuid;

use crate::repository::VideoRepository;

#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get(&self, id: Uuid) -> Result<Video, AppError> {
        self.videos
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))
    }

    async fn update(&self, video: &Video) -> Result<(), AppError> {
        let mut videos = self.videos.write().await;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(())
            }
            None => Err(AppError::NotFound("Couldn't find video".to_string())),
        }
    }

    async fn create(&self, video: &Video) -> Result<(), AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::BadRequest("Video already exists".to_string()));
        }
        videos.insert(video.id, video.clone());
        Ok(())
    }
}
