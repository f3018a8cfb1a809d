//! Volatile in-process cache backend.
//!
//! Holds at most one asset per owning record. Entries live from process start to
//! process end and are never persisted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::naming::ContentName;
use crate::traits::{PutObject, Staging, Storage, StorageReference, StorageResult};
use crate::StorageBackend;

/// One cached asset. Shared out as `Arc` so readers never observe a partial entry.
#[derive(Debug, Clone)]
pub struct CachedAsset {
    pub name: ContentName,
    pub media_type: String,
    pub data: Bytes,
}

/// In-process cache keyed by owning record id.
///
/// The payload is collected before the write lock is taken, so the lock only
/// guards a map insert. A `put` for a record replaces the previous entry whole.
#[derive(Clone)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<Uuid, Arc<CachedAsset>>>>,
    base_url: String,
}

impl MemoryStorage {
    /// # Arguments
    /// * `base_url` - URL prefix cache references resolve under
    ///   (e.g., "http://localhost:8091/api/thumbnails")
    pub fn new(base_url: String) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            base_url,
        }
    }

    /// Snapshot of the asset cached for a record.
    pub async fn get(&self, record_id: Uuid) -> Option<Arc<CachedAsset>> {
        self.entries.read().await.get(&record_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn generate_url(&self, record_id: Uuid) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), record_id)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, object: PutObject) -> StorageResult<StorageReference> {
        let start = std::time::Instant::now();
        let data = object.body.into_bytes().await?;
        let size = data.len();

        let asset = Arc::new(CachedAsset {
            name: object.name,
            media_type: object.media_type.essence(),
            data,
        });

        let replaced = self
            .entries
            .write()
            .await
            .insert(object.record_id, asset)
            .is_some();

        tracing::info!(
            record_id = %object.record_id,
            size_bytes = size,
            replaced,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cached asset stored"
        );

        Ok(StorageReference {
            key: object.record_id.to_string(),
            url: self.generate_url(object.record_id),
        })
    }

    async fn close(&self) -> StorageResult<()> {
        let mut entries = self.entries.write().await;
        tracing::debug!(entries = entries.len(), "Dropping cached assets");
        entries.clear();
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    fn staging(&self) -> Staging {
        Staging::InMemory
    }
}
