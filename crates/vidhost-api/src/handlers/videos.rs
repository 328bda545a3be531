//! Video listing handlers.

use axum::extract::{Path, State};
use axum::Json;
use vidhost_models::VideoListing;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List all videos, newest first. Storage failures read as an empty list.
pub async fn list_videos(State(state): State<AppState>) -> Json<Vec<VideoListing>> {
    Json(state.catalog.list_videos().await)
}

/// Fetch one video for the watch page.
pub async fn get_video(
    State(state): State<AppState>,
    Path(object_id): Path<String>,
) -> ApiResult<Json<VideoListing>> {
    state
        .catalog
        .find_video(&object_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("video {}", object_id)))
}
