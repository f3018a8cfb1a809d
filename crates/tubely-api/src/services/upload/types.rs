use std::sync::Arc;

use axum::{body::Body, http::HeaderMap};
use thiserror::Error;
use tubely_core::{AppError, Config, MediaClass, UploadStage};
use tubely_storage::{Staging, Storage};

use crate::utils::upload::UploadPolicy;

/// How a flow buffers the accepted field before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStaging {
    /// Collect the whole field in memory.
    InMemory,
    /// Hand the field to the backend as a stream.
    WriteThrough,
    /// Spill to a temporary file, rewind, then hand the file to the backend.
    TempFile,
}

impl From<Staging> for FlowStaging {
    fn from(staging: Staging) -> Self {
        match staging {
            Staging::InMemory => FlowStaging::InMemory,
            Staging::WriteThrough => FlowStaging::WriteThrough,
        }
    }
}

/// Everything that distinguishes one upload flow from another.
pub struct UploadFlow {
    pub class: MediaClass,
    pub policy: UploadPolicy,
    pub staging: FlowStaging,
    pub storage: Arc<dyn Storage>,
}

impl UploadFlow {
    /// Thumbnails stage the way their backend prefers.
    pub fn thumbnail(config: &Config, storage: Arc<dyn Storage>) -> Self {
        Self {
            class: MediaClass::Thumbnail,
            policy: UploadPolicy::for_class(MediaClass::Thumbnail, config),
            staging: storage.staging().into(),
            storage,
        }
    }

    /// Videos always spill to a temporary file first.
    pub fn video(config: &Config, storage: Arc<dyn Storage>) -> Self {
        Self {
            class: MediaClass::Video,
            policy: UploadPolicy::for_class(MediaClass::Video, config),
            staging: FlowStaging::TempFile,
            storage,
        }
    }
}

/// Raw inputs of one upload request.
pub struct UploadRequest {
    pub video_id: String,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Failure of an upload, tagged with the last stage it completed.
#[derive(Debug, Error)]
#[error("upload failed after stage {stage}: {error}")]
pub struct UploadFailure {
    pub stage: UploadStage,
    #[source]
    pub error: AppError,
}
