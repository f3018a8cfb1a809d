use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tubely_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::services::upload::UploadRequest;
use crate::state::AppState;

/// `POST /api/videos/{video_id}/thumbnail`
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Value>, HttpAppError> {
    let video = state
        .uploads
        .run(
            &state.thumbnail_flow,
            UploadRequest {
                video_id,
                headers,
                body,
            },
        )
        .await?;

    tracing::debug!(
        video_id = %video.id,
        thumbnail_url = ?video.thumbnail_url,
        "Thumbnail uploaded"
    );
    Ok(Json(json!({})))
}

/// `GET /api/thumbnails/{video_id}`, served from the in-process cache.
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;

    let not_found = || AppError::NotFound("Thumbnail not found".to_string());
    let cache = state.thumbnail_cache.as_ref().ok_or_else(not_found)?;
    let asset = cache.get(video_id).await.ok_or_else(not_found)?;

    Ok((
        [
            (header::CONTENT_TYPE, asset.media_type.clone()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        asset.data.clone(),
    ))
}
