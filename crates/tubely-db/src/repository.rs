use async_trait::async_trait;
use tubely_core::{AppError, Video};
use uuid::Uuid;

/// Narrow record-store interface used by the upload pipeline.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a record. Unknown ids are `AppError::NotFound`.
    async fn get(&self, id: Uuid) -> Result<Video, AppError>;

    /// Persist every mutable field of an existing record.
    async fn update(&self, video: &Video) -> Result<(), AppError>;

    /// Insert a new record.
    async fn create(&self, video: &Video) -> Result<(), AppError>;
}
