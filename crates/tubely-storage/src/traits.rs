//! Storage abstraction trait
//!
//! Every backend persists one object per `put` and hands back a durable,
//! fetchable reference. A returned reference means the bytes are fully written;
//! on error nothing half-written may remain visible under the object's name.

use std::io;

use async_trait::async_trait;
use thiserror::Error;
use tubely_core::MediaType;
use uuid::Uuid;

use crate::body::MediaBody;
use crate::naming::ContentName;
use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Reading the inbound media failed; the backend itself was healthy.
    #[error("Failed to read upload source: {0}")]
    SourceRead(#[source] io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable locator returned after a successful `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageReference {
    /// Backend-internal key (file name, object key or cache key)
    pub key: String,
    /// Publicly fetchable URL
    pub url: String,
}

/// One object to persist.
#[derive(Debug)]
pub struct PutObject {
    /// Owning record the object belongs to
    pub record_id: Uuid,
    pub name: ContentName,
    pub media_type: MediaType,
    /// Known size of `body`, when the caller staged it
    pub content_length: Option<u64>,
    pub body: MediaBody,
}

/// How a small upload should be staged before it reaches a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staging {
    /// Read the whole payload into memory first
    InMemory,
    /// Hand the inbound stream straight to the backend
    WriteThrough,
}

/// Storage abstraction trait
///
/// Backends are interchangeable: the orchestrator only observes reference format
/// and latency differences between them.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist one object and return its reference.
    async fn put(&self, object: PutObject) -> StorageResult<StorageReference>;

    /// Release transient resources held by the backend.
    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Preferred staging for payloads small enough to buffer.
    fn staging(&self) -> Staging {
        Staging::WriteThrough
    }
}
