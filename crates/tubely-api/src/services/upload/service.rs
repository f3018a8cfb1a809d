//! Upload pipeline
//!
//! Drives one upload from raw request to committed record reference:
//! identify the caller → load and authorise the record → validate the field →
//! stage → name → persist → commit. Each failure carries the last stage reached.

use std::path::PathBuf;
use std::sync::Arc;

use tubely_core::{AppError, UploadStage, Video};
use tubely_db::VideoRepository;
use tubely_storage::{ContentName, PutObject, StorageError};
use uuid::Uuid;

use super::staging::stage_upload;
use super::types::{UploadFailure, UploadFlow, UploadRequest};
use crate::auth::{get_bearer_token, IdentityVerifier};
use crate::utils::upload::{source_read_error, validate_upload};

/// Orchestrates uploads for every flow.
pub struct UploadPipeline {
    identity: Arc<dyn IdentityVerifier>,
    videos: Arc<dyn VideoRepository>,
    temp_dir: PathBuf,
}

impl UploadPipeline {
    pub fn new(
        identity: Arc<dyn IdentityVerifier>,
        videos: Arc<dyn VideoRepository>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            identity,
            videos,
            temp_dir,
        }
    }

    /// Run `request` through `flow` and return the updated record.
    #[tracing::instrument(skip_all, fields(class = %flow.class, video_id = %request.video_id))]
    pub async fn run(
        &self,
        flow: &UploadFlow,
        request: UploadRequest,
    ) -> Result<Video, UploadFailure> {
        let mut stage = UploadStage::Received;
        let at = |stage: UploadStage| move |error: AppError| UploadFailure { stage, error };

        let video_id = Uuid::parse_str(request.video_id.trim())
            .map_err(|_| AppError::BadRequest("Invalid ID".to_string()))
            .map_err(at(stage))?;

        let token = get_bearer_token(&request.headers).map_err(at(stage))?;
        let user_id = self.identity.verify(token).map_err(at(stage))?;

        let mut video = self.videos.get(video_id).await.map_err(at(stage))?;
        if !video.is_owned_by(user_id) {
            return Err(at(stage)(AppError::Unauthorized(
                "You are not authorised to access this video".to_string(),
            )));
        }

        tracing::info!(user_id = %user_id, max_bytes = flow.policy.max_bytes, "Uploading media");

        let upload = validate_upload(&request.headers, request.body, &flow.policy)
            .await
            .map_err(at(stage))?;
        stage = UploadStage::Validated;

        let staged = stage_upload(upload.field, &upload.media_type, flow.staging, &self.temp_dir)
            .await
            .map_err(at(stage))?;
        stage = UploadStage::Staged;

        let name = ContentName::generate(&upload.media_type);
        let (body, content_length, guard) = staged.into_parts();
        let put = flow
            .storage
            .put(PutObject {
                record_id: video.id,
                name: name.clone(),
                media_type: upload.media_type.clone(),
                content_length,
                body,
            })
            .await;
        // The staging file is released whether or not the backend accepted it.
        guard.release();

        let reference = put.map_err(storage_failure).map_err(at(stage))?;
        stage = UploadStage::Persisted;
        tracing::info!(
            backend = %flow.storage.backend_type(),
            key = %reference.key,
            media_type = %upload.media_type,
            "Media persisted"
        );

        video.set_reference(flow.class, reference.url);
        self.videos.update(&video).await.map_err(|e| {
            tracing::error!(error = %e, name = %name, "Media persisted but record update failed");
            at(stage)(AppError::RecordUpdate(e.to_string()))
        })?;
        stage = UploadStage::Committed;

        tracing::info!(stage = %stage, "Upload committed");
        Ok(video)
    }
}

fn storage_failure(err: StorageError) -> AppError {
    match err {
        StorageError::SourceRead(e) => source_read_error(e),
        other => AppError::Storage(other.to_string()),
    }
}
