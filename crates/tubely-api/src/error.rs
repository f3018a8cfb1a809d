//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Any `AppError` (or an
//! upload failure carrying the stage it reached) converts into `HttpAppError`, which
//! renders the status, a JSON body and a log line at the error's level.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tubely_core::{AppError, ErrorMetadata, LogLevel, UploadStage};

use crate::services::upload::UploadFailure;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Last upload stage reached before the failure, for upload endpoints only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<UploadStage>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from tubely-core)
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    pub stage: Option<UploadStage>,
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        HttpAppError { error, stage: None }
    }
}

impl From<UploadFailure> for HttpAppError {
    fn from(failure: UploadFailure) -> Self {
        HttpAppError {
            error: failure.error,
            stage: Some(failure.stage),
        }
    }
}

fn log_error(error: &AppError, stage: Option<UploadStage>) {
    let error_type = error.error_type();
    let stage = stage.map(|s| s.to_string());
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, stage = ?stage, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, stage = ?stage, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, stage = ?stage, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.error, self.stage);

        // Sensitive variants only ever expose their fixed client message.
        let body = Json(ErrorResponse {
            error: self.error.client_message(),
            code: self.error.error_code().to_string(),
            stage: self.stage,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_storage_error_hides_backend_detail() {
        let response = HttpAppError {
            error: AppError::Storage("bucket tubely-prod: AccessDenied".to_string()),
            stage: Some(UploadStage::Staged),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Error saving media");
        assert_eq!(body["code"], "STORAGE_ERROR");
        assert_eq!(body["stage"], "staged");
    }

    #[tokio::test]
    async fn test_internal_error_with_source_renders_only_message() {
        let response = HttpAppError::from(AppError::InternalWithSource {
            message: "Couldn't write file to disk".to_string(),
            source: anyhow::anyhow!("/var/lib/tubely/secret: no space left on device"),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Couldn't write file to disk");
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_bad_request_omits_stage_when_absent() {
        let response =
            HttpAppError::from(AppError::BadRequest("Invalid ID".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid ID");
        assert!(body.get("stage").is_none());
    }

    #[tokio::test]
    async fn test_payload_too_large_status() {
        let response =
            HttpAppError::from(AppError::PayloadTooLarge("too big".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
