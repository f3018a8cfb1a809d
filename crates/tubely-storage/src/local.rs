use crate::body::{copy_body, MediaBody};
use crate::traits::{PutObject, Storage, StorageError, StorageReference, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Objects are written to `{base_path}/.{name}.partial` and renamed into place
/// once synced, so a name only ever resolves to a complete file.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert an object name to its final path, rejecting anything that could
    /// escape the storage root.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key.contains("..")
            || key.contains('/')
            || key.contains('\\')
            || key.starts_with('.')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    fn partial_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!(".{}.partial", key))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn write_partial(&self, path: &Path, body: MediaBody) -> StorageResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let written = match body {
            MediaBody::Bytes(bytes) => {
                file.write_all(&bytes).await.map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to write file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                bytes.len() as u64
            }
            MediaBody::Reader(mut reader) => {
                copy_body(&mut reader, &mut file).await.map_err(|e| match e {
                    StorageError::IoError(e) => StorageError::UploadFailed(format!(
                        "Failed to write stream to file {}: {}",
                        path.display(),
                        e
                    )),
                    other => other,
                })?
            }
        };

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(written)
    }

    async fn remove_partial(path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove partial file"
                );
            }
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, object: PutObject) -> StorageResult<StorageReference> {
        let key = object.name.to_string();
        let path = self.key_to_path(&key)?;
        let partial = self.partial_path(&key);
        let start = std::time::Instant::now();

        let written = match self.write_partial(&partial, object.body).await {
            Ok(written) => written,
            Err(e) => {
                Self::remove_partial(&partial).await;
                tracing::warn!(
                    error = %e,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage upload failed"
                );
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial, &path).await {
            Self::remove_partial(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            )));
        }

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            record_id = %object.record_id,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StorageReference { key, url })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
