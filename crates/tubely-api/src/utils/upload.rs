//! Upload validation
//!
//! Locates the expected multipart field and checks its declared media type against
//! the flow's allowlist before a single byte is handed to storage. Byte ceilings are
//! installed as multipart constraints, so they are enforced while the body streams
//! and surface as `PayloadTooLarge` from whichever stage reads past them.

use std::io;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap},
};
use multer::{Constraints, Multipart, SizeLimit};
use tubely_core::{AppError, Config, MediaClass, MediaType};

use crate::constants::MULTIPART_OVERHEAD_BYTES;

/// Per-flow acceptance rules.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub field_name: &'static str,
    pub allowed_content_types: Vec<String>,
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn for_class(class: MediaClass, config: &Config) -> Self {
        let (allowed_content_types, max_bytes) = match class {
            MediaClass::Thumbnail => (
                config.thumbnail_allowed_content_types.clone(),
                config.thumbnail_max_bytes,
            ),
            MediaClass::Video => (
                config.video_allowed_content_types.clone(),
                config.video_max_bytes,
            ),
        };
        Self {
            field_name: class.field_name(),
            allowed_content_types,
            max_bytes,
        }
    }
}

/// The accepted media field, not yet read, and its declared type.
pub struct ValidatedUpload {
    pub field: multer::Field<'static>,
    pub media_type: MediaType,
}

/// Validate an inbound multipart request against `policy`.
pub async fn validate_upload(
    headers: &HeaderMap,
    body: Body,
    policy: &UploadPolicy,
) -> Result<ValidatedUpload, AppError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let boundary = multer::parse_boundary(content_type).map_err(multipart_error)?;

    let constraints = Constraints::new().size_limit(
        SizeLimit::new()
            .per_field(policy.max_bytes)
            .whole_stream(policy.max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)),
    );
    let mut multipart = Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(policy.field_name) {
            continue;
        }

        let media_type = field
            .content_type()
            .map(MediaType::from_mime)
            .ok_or_else(|| AppError::BadRequest("Malformed request header".to_string()))?;

        if !media_type.is_allowed(&policy.allowed_content_types) {
            return Err(AppError::BadRequest(format!(
                "Unsupported media type: {}",
                media_type
            )));
        }

        tracing::debug!(
            field = policy.field_name,
            media_type = %media_type,
            file_name = ?field.file_name(),
            "Upload field accepted"
        );
        return Ok(ValidatedUpload { field, media_type });
    }

    Err(AppError::BadRequest(format!(
        "Missing form field '{}'",
        policy.field_name
    )))
}

fn payload_too_large(limit: u64) -> AppError {
    AppError::PayloadTooLarge(format!(
        "Upload exceeds the maximum allowed size of {} bytes",
        limit
    ))
}

/// Map a multipart parsing failure to the error taxonomy.
pub fn multipart_error(err: multer::Error) -> AppError {
    match err {
        multer::Error::StreamSizeExceeded { limit }
        | multer::Error::FieldSizeExceeded { limit, .. } => payload_too_large(limit),
        other => AppError::InternalWithSource {
            message: "Couldn't parse form".to_string(),
            source: other.into(),
        },
    }
}

/// Map a failure to read the upload body, surfaced through an `AsyncRead` adapter.
pub fn source_read_error(err: io::Error) -> AppError {
    let limit = match err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<multer::Error>())
    {
        Some(multer::Error::StreamSizeExceeded { limit })
        | Some(multer::Error::FieldSizeExceeded { limit, .. }) => Some(*limit),
        _ => None,
    };

    match limit {
        Some(limit) => payload_too_large(limit),
        None => AppError::InternalWithSource {
            message: "Couldn't read upload".to_string(),
            source: err.into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use futures::TryStreamExt;
    use tokio::io::AsyncReadExt;
    use tokio_util::io::StreamReader;

    const BOUNDARY: &str = "X-TUBELY-BOUNDARY";

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={}", BOUNDARY)).unwrap(),
        );
        headers
    }

    fn part(name: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"upload\"\r\n",
            BOUNDARY, name
        )
        .into_bytes();
        if let Some(ct) = content_type {
            out.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(data);
        out.extend_from_slice(b"\r\n");
        out
    }

    fn body(parts: Vec<Vec<u8>>) -> Body {
        let mut out: Vec<u8> = parts.into_iter().flatten().collect();
        out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(out)
    }

    fn policy(max_bytes: u64) -> UploadPolicy {
        UploadPolicy {
            field_name: "thumbnail",
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
            max_bytes,
        }
    }

    #[tokio::test]
    async fn test_accepts_allowed_field() {
        let body = body(vec![
            part("title", Some("text/plain"), b"ignored"),
            part("thumbnail", Some("image/png"), &[0x89, b'P', b'N', b'G']),
        ]);

        let upload = validate_upload(&headers(), body, &policy(1024)).await.unwrap();
        assert_eq!(upload.media_type.essence(), "image/png");
        assert_eq!(upload.field.bytes().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let body = body(vec![part("other", Some("image/png"), b"data")]);
        let err = validate_upload(&headers(), body, &policy(1024))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("thumbnail")));
    }

    #[tokio::test]
    async fn test_disallowed_type_is_bad_request() {
        let body = body(vec![part("thumbnail", Some("text/plain"), b"hello")]);
        let err = validate_upload(&headers(), body, &policy(1024))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("text/plain")));
    }

    #[tokio::test]
    async fn test_type_parameters_are_ignored() {
        let body = body(vec![part("thumbnail", Some("IMAGE/PNG; q=1"), b"png")]);
        let upload = validate_upload(&headers(), body, &policy(1024)).await.unwrap();
        assert_eq!(upload.media_type.essence(), "image/png");
    }

    #[tokio::test]
    async fn test_missing_part_content_type_is_malformed() {
        let body = body(vec![part("thumbnail", None, b"png")]);
        let err = validate_upload(&headers(), body, &policy(1024))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Malformed request header"));
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_parse_error() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = validate_upload(&headers, Body::from("{}"), &policy(1024))
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            AppError::InternalWithSource { ref message, .. } if message == "Couldn't parse form"
        ));
    }

    #[tokio::test]
    async fn test_oversized_field_is_payload_too_large_when_read() {
        let body = body(vec![part("thumbnail", Some("image/png"), &[7u8; 4096])]);
        let upload = validate_upload(&headers(), body, &policy(1024)).await.unwrap();

        let err = upload.field.bytes().await.unwrap_err();
        assert!(matches!(multipart_error(err), AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_oversized_field_through_reader_is_payload_too_large() {
        let body = body(vec![part("thumbnail", Some("image/png"), &[7u8; 4096])]);
        let upload = validate_upload(&headers(), body, &policy(1024)).await.unwrap();

        let mut reader = StreamReader::new(upload.field.map_err(io::Error::other));
        let mut sink = Vec::new();
        let err = reader.read_to_end(&mut sink).await.unwrap_err();
        assert!(matches!(source_read_error(err), AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_plain_io_error_is_internal() {
        let err = source_read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(matches!(err, AppError::InternalWithSource { .. }));
    }
}
