#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{
    MemoryStorage, Storage, StorageBackend, StorageError, StorageResult, ASSETS_ROUTE, CACHE_ROUTE,
};
use std::sync::Arc;
use tubely_core::Config;

/// A backend ready for use by an upload flow.
///
/// `cache` is set when the backend is the in-process cache, so the HTTP layer can
/// serve the entries its references point at.
#[derive(Clone)]
pub struct ConfiguredStorage {
    pub storage: Arc<dyn Storage>,
    pub cache: Option<Arc<MemoryStorage>>,
}

/// Create a storage backend based on configuration
pub async fn create_storage(
    backend: StorageBackend,
    config: &Config,
) -> StorageResult<ConfiguredStorage> {
    let public_base_url = config.public_base_url.trim_end_matches('/');

    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            Ok(ConfiguredStorage {
                storage: Arc::new(storage),
                cache: None,
            })
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_url = format!("{}{}", public_base_url, ASSETS_ROUTE);
            let storage = LocalStorage::new(config.assets_root.clone(), base_url).await?;
            Ok(ConfiguredStorage {
                storage: Arc::new(storage),
                cache: None,
            })
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            let cache = Arc::new(MemoryStorage::new(format!(
                "{}{}",
                public_base_url, CACHE_ROUTE
            )));
            Ok(ConfiguredStorage {
                storage: cache.clone(),
                cache: Some(cache),
            })
        }
    }
}
