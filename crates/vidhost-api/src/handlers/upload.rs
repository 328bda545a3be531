//! Video upload handler.

use std::time::Instant;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use vidhost_models::{UploadConstraints, UploadMetadata, UploadRejection, UploadedVideo};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the video file.
pub const VIDEO_FIELD: &str = "video";

/// Upload success response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub video: UploadedVideo,
    pub title: String,
}

/// File part of an upload form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Parsed upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Accept a video upload and store it.
///
/// Every precondition is checked before storage is contacted.
pub async fn upload_video(State(state): State<AppState>, multipart: Multipart) -> Response {
    let production = state.config.is_production();
    match store_upload(&state, multipart).await {
        Ok(body) => body.into_response(),
        Err(e) => e.into_response_for(production),
    }
}

async fn store_upload(state: &AppState, multipart: Multipart) -> ApiResult<Json<UploadResponse>> {
    let form = read_upload_form(multipart).await?;

    let (file, metadata) = match validate_form(form, state) {
        Ok(valid) => valid,
        Err(rejection) => {
            warn!(reason = %rejection, "Upload rejected");
            metrics::record_upload_rejection(rejection_reason(&rejection));
            return Err(rejection.into());
        }
    };

    let _permit = state
        .upload_slots
        .acquire()
        .await
        .map_err(|_| ApiError::internal("upload slots closed"))?;

    let start = Instant::now();
    let result = state
        .catalog
        .upload_video(file.data, &file.file_name, &file.content_type)
        .await;
    let duration = start.elapsed().as_secs_f64();

    let video = match result {
        Ok(video) => {
            metrics::record_upload("success", duration);
            video
        }
        Err(e) => {
            warn!(
                file_name = %file.file_name,
                kind = e.kind(),
                error = %e,
                "Upload to storage failed"
            );
            metrics::record_upload("failure", duration);
            return Err(e.into());
        }
    };

    info!(
        title = %metadata.title,
        object_id = %video.object_id,
        stored_file_name = %video.stored_file_name,
        size = video.content_length,
        "Video uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "Video uploaded successfully!".to_string(),
        video,
        title: metadata.title,
    }))
}

/// Collect the `video`, `title` and `description` fields. Unknown fields are skipped.
pub async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            VIDEO_FIELD => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;

                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(form)
}

/// Presence, then metadata, then content type, then size.
fn validate_form(
    form: UploadForm,
    state: &AppState,
) -> Result<(UploadedFile, UploadMetadata), UploadRejection> {
    let file = form
        .file
        .filter(|f| !f.data.is_empty())
        .ok_or(UploadRejection::MissingFile)?;

    let metadata = UploadMetadata::new(
        form.title.unwrap_or_default().trim(),
        form.description.unwrap_or_default(),
    );
    metadata.check()?;

    UploadConstraints::new(state.config.max_upload_bytes)
        .check(&file.content_type, file.data.len() as u64)?;

    Ok((file, metadata))
}

fn rejection_reason(rejection: &UploadRejection) -> &'static str {
    match rejection {
        UploadRejection::MissingFile => "missing_file",
        UploadRejection::MissingTitle => "missing_title",
        UploadRejection::UnsupportedContentType(_) => "content_type",
        UploadRejection::TooLarge { .. } => "too_large",
        UploadRejection::InvalidMetadata(_) => "metadata",
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::bad_request(e.body_text())
    }
}
