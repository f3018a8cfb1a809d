use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use tubely_core::{AppError, StorageBackend, Video};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{PutObject, Storage, StorageError, StorageReference, StorageResult};
use uuid::Uuid;

/// What a backend received for one `put`.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub record_id: Uuid,
    pub name: String,
    pub media_type: String,
    pub content_length: Option<u64>,
    pub data: Bytes,
}

/// Backend that keeps every object it is handed.
#[derive(Default)]
pub struct RecordingStorage {
    puts: Mutex<Vec<RecordedPut>>,
}

impl RecordingStorage {
    pub async fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().await.clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn put(&self, object: PutObject) -> StorageResult<StorageReference> {
        let data = object.body.into_bytes().await?;
        let name = object.name.to_string();
        self.puts.lock().await.push(RecordedPut {
            record_id: object.record_id,
            name: name.clone(),
            media_type: object.media_type.essence(),
            content_length: object.content_length,
            data,
        });
        Ok(StorageReference {
            url: format!("recorded://{}", name),
            key: name,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Backend that drains the payload and then refuses it.
#[derive(Default)]
pub struct FailingStorage {
    calls: AtomicUsize,
}

impl FailingStorage {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn put(&self, object: PutObject) -> StorageResult<StorageReference> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        object.body.into_bytes().await?;
        Err(StorageError::UploadFailed("backend unavailable".to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Record store whose writes always fail.
pub struct FailingUpdateRepository {
    inner: Arc<InMemoryVideoRepository>,
}

impl FailingUpdateRepository {
    pub fn new(inner: Arc<InMemoryVideoRepository>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl VideoRepository for FailingUpdateRepository {
    async fn get(&self, id: Uuid) -> Result<Video, AppError> {
        self.inner.get(id).await
    }

    async fn update(&self, _video: &Video) -> Result<(), AppError> {
        Err(AppError::Internal("connection reset by peer".to_string()))
    }

    async fn create(&self, video: &Video) -> Result<(), AppError> {
        self.inner.create(video).await
    }
}
