use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tubely_core::{AppError, Video};
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::services::upload::UploadRequest;
use crate::state::AppState;

/// `POST /api/videos/{video_id}/video`
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<StatusCode, HttpAppError> {
    let video = state
        .uploads
        .run(
            &state.video_flow,
            UploadRequest {
                video_id,
                headers,
                body,
            },
        )
        .await?;

    tracing::debug!(video_id = %video.id, video_url = ?video.video_url, "Video uploaded");
    Ok(StatusCode::OK)
}

/// `GET /api/videos/{video_id}`
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;
    let video = state.videos.get(video_id).await?;
    Ok(Json(video))
}
