use crate::body::{copy_body, MediaBody};
use crate::traits::{PutObject, Storage, StorageError, StorageReference, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// S3 storage implementation
///
/// Bodies are streamed through an object_store `BufWriter`, which switches to a
/// multipart upload once the payload outgrows its buffer. Nothing is kept
/// locally after `put` returns.
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the environment (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, ...)
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket, region, endpoint_url))
    }

    /// Wrap an already-built object store.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        }
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, path style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    async fn write_object(writer: &mut BufWriter, body: MediaBody) -> StorageResult<u64> {
        let mut reader = body.into_reader();
        let size = copy_body(&mut reader, writer).await?;
        writer.shutdown().await?;
        Ok(size)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(&self, object: PutObject) -> StorageResult<StorageReference> {
        let key = object.name.to_string();
        let location = Path::from(key.clone());
        let start = std::time::Instant::now();

        let attributes = Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(object.media_type.essence()),
        )]);
        let mut writer =
            BufWriter::new(Arc::clone(&self.store), location).with_attributes(attributes);

        let size = match Self::write_object(&mut writer, object.body).await {
            Ok(size) => size,
            Err(e) => {
                if let Err(abort_err) = writer.abort().await {
                    tracing::debug!(
                        error = %abort_err,
                        key = %key,
                        "Failed to abort S3 upload"
                    );
                }
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                return Err(match e {
                    StorageError::IoError(e) => StorageError::UploadFailed(e.to_string()),
                    other => other,
                });
            }
        };

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            record_id = %object.record_id,
            content_type = %object.media_type,
            size_bytes = size,
            expected_bytes = ?object.content_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StorageReference { key, url })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
