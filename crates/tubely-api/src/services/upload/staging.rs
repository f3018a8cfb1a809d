use std::io::{self, SeekFrom};
use std::path::Path;

use futures::TryStreamExt;
use tempfile::TempPath;
use tokio::io::AsyncSeekExt;
use tokio_util::io::StreamReader;
use tubely_core::{AppError, MediaType};
use tubely_storage::{copy_body, MediaBody, StorageError};

use super::types::FlowStaging;
use crate::utils::upload::{multipart_error, source_read_error};

const TEMP_FILE_PREFIX: &str = "tubely_upload";

/// An accepted field, staged and ready to hand to a backend.
pub struct StagedUpload {
    pub body: MediaBody,
    pub content_length: Option<u64>,
    temp_path: Option<TempPath>,
}

impl StagedUpload {
    /// Split into the payload and the guard owning any staging file.
    pub fn into_parts(self) -> (MediaBody, Option<u64>, StagingGuard) {
        (self.body, self.content_length, StagingGuard(self.temp_path))
    }
}

/// Owns the staging file of a `TempFile` flow.
///
/// `release` removes it and logs the outcome; dropping the guard removes it too.
pub struct StagingGuard(Option<TempPath>);

impl StagingGuard {
    pub fn release(self) {
        let Some(path) = self.0 else {
            return;
        };
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => tracing::debug!(path = %shown, "Staging file removed"),
            Err(e) => tracing::warn!(path = %shown, error = %e, "Failed to remove staging file"),
        }
    }
}

fn field_reader(field: multer::Field<'static>) -> impl tokio::io::AsyncRead + Send + Unpin {
    StreamReader::new(field.map_err(io::Error::other))
}

/// Stage the accepted field according to the flow's strategy.
pub async fn stage_upload(
    field: multer::Field<'static>,
    media_type: &MediaType,
    staging: FlowStaging,
    temp_dir: &Path,
) -> Result<StagedUpload, AppError> {
    match staging {
        FlowStaging::InMemory => {
            let data = field.bytes().await.map_err(multipart_error)?;
            Ok(StagedUpload {
                content_length: Some(data.len() as u64),
                body: MediaBody::Bytes(data),
                temp_path: None,
            })
        }
        FlowStaging::WriteThrough => Ok(StagedUpload {
            body: MediaBody::from_reader(field_reader(field)),
            content_length: None,
            temp_path: None,
        }),
        FlowStaging::TempFile => spill_to_temp_file(field, media_type, temp_dir).await,
    }
}

async fn spill_to_temp_file(
    field: multer::Field<'static>,
    media_type: &MediaType,
    temp_dir: &Path,
) -> Result<StagedUpload, AppError> {
    let temp_error = |message: &str, e: io::Error| AppError::InternalWithSource {
        message: message.to_string(),
        source: e.into(),
    };

    let named = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .suffix(&format!(".{}", media_type.extension()))
        .tempfile_in(temp_dir)
        .map_err(|e| temp_error("Couldn't create temp file", e))?;
    let (std_file, path) = named.into_parts();
    let mut file = tokio::fs::File::from_std(std_file);

    // `path` removes the file on drop, so every early return below cleans up.
    let mut reader = field_reader(field);
    let written = match copy_body(&mut reader, &mut file).await {
        Ok(written) => written,
        Err(StorageError::SourceRead(e)) => return Err(source_read_error(e)),
        Err(StorageError::IoError(e)) => {
            return Err(temp_error("Couldn't write file to disk", e));
        }
        Err(e) => {
            return Err(AppError::InternalWithSource {
                message: "Couldn't write file to disk".to_string(),
                source: e.into(),
            });
        }
    };

    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| temp_error("Couldn't reset file pointer", e))?;

    tracing::debug!(path = %path.display(), bytes = written, "Upload spilled to staging file");

    Ok(StagedUpload {
        body: MediaBody::from_reader(file),
        content_length: Some(written),
        temp_path: Some(path),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tempfile::TempDir;

    const BOUNDARY: &str = "STAGING";

    async fn field(data: &[u8], limit: u64) -> multer::Field<'static> {
        let mut raw = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"v.mp4\"\r\nContent-Type: video/mp4\r\n\r\n",
            b = BOUNDARY
        )
        .into_bytes();
        raw.extend_from_slice(data);
        raw.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let constraints =
            multer::Constraints::new().size_limit(multer::SizeLimit::new().per_field(limit));
        let mut multipart = multer::Multipart::with_constraints(
            Body::from(raw).into_data_stream(),
            BOUNDARY,
            constraints,
        );
        multipart.next_field().await.unwrap().unwrap()
    }

    fn entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_temp_file_is_rewound_and_released() {
        let dir = TempDir::new().unwrap();
        let media_type: MediaType = "video/mp4".parse().unwrap();
        let data = vec![42u8; 200 * 1024];

        let staged = stage_upload(
            field(&data, 1 << 20).await,
            &media_type,
            FlowStaging::TempFile,
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(staged.content_length, Some(data.len() as u64));
        assert_eq!(entries(&dir), 1);

        let (body, _, guard) = staged.into_parts();
        let read_back = body.into_bytes().await.unwrap();
        assert_eq!(read_back.as_ref(), data.as_slice());

        guard.release();
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_temp_file_removed_when_ceiling_exceeded() {
        let dir = TempDir::new().unwrap();
        let media_type: MediaType = "video/mp4".parse().unwrap();

        let result = stage_upload(
            field(&[1u8; 8192], 1024).await,
            &media_type,
            FlowStaging::TempFile,
            dir.path(),
        )
        .await;

        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
        assert_eq!(entries(&dir), 0);
    }

    #[tokio::test]
    async fn test_in_memory_staging_collects_bytes() {
        let dir = TempDir::new().unwrap();
        let media_type: MediaType = "image/png".parse().unwrap();

        let staged = stage_upload(
            field(b"pixels", 1024).await,
            &media_type,
            FlowStaging::InMemory,
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(staged.content_length, Some(6));
        assert!(matches!(staged.body, MediaBody::Bytes(ref b) if b.as_ref() == b"pixels"));
        assert_eq!(entries(&dir), 0);
    }
}
