//! Upload orchestration
//!
//! One pipeline drives both media flows:
//! authenticate → authorise → validate → stage → name → persist → commit.
//! Flows differ only in their `UploadFlow`: policy, staging strategy and backend.

mod service;
mod staging;
mod types;

pub use service::UploadPipeline;
pub use staging::{stage_upload, StagedUpload};
pub use types::{FlowStaging, UploadFailure, UploadFlow, UploadRequest};
