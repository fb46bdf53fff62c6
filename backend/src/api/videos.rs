use std::sync::Arc;

use axum::{extract::Path, http::HeaderMap, http::StatusCode, Extension, Json};
use shared::flows::{RecordVideoRequest, VideoVerification, VideoView};
use uuid::Uuid;

use super::bearer;
use crate::custody::Custody;
use crate::error::ApiError;

pub async fn record_video(
    Extension(custody): Extension<Arc<Custody>>,
    headers: HeaderMap,
    Json(payload): Json<RecordVideoRequest>,
) -> Result<(StatusCode, Json<VideoView>), ApiError> {
    let token = bearer(&headers)?;
    let video = custody
        .record_video(token, &payload.location_url, &payload.title, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(video.view())))
}

pub async fn list_videos(
    Extension(custody): Extension<Arc<Custody>>,
    headers: HeaderMap,
) -> Result<Json<Vec<VideoView>>, ApiError> {
    let token = bearer(&headers)?;
    let videos = custody.list_videos(token).await?;

    Ok(Json(videos.iter().map(|v| v.view()).collect()))
}

/// Public: anyone holding a video id can check its signature.
pub async fn verify_video(
    Extension(custody): Extension<Arc<Custody>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VideoVerification>, ApiError> {
    Ok(Json(custody.verify_video(id).await?))
}
