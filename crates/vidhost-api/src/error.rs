//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use vidhost_models::UploadRejection;
use vidhost_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Rejected(#[from] UploadRejection),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) | ApiError::Rejected(UploadRejection::TooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short headline for the `error` field.
    fn headline(&self) -> String {
        match self {
            ApiError::NotFound(_) => "Not found".to_string(),
            ApiError::BadRequest(_) => "Bad request".to_string(),
            ApiError::PayloadTooLarge(_) => "File too large".to_string(),
            ApiError::Rejected(rejection) => rejection.to_string(),
            ApiError::Internal(_) => "Internal error".to_string(),
            ApiError::Storage(e) => format!("Upload failed: {}", e.kind()),
        }
    }

    /// Diagnostic detail. Internal errors are masked in production, except
    /// for the explanation the storage service itself returned.
    fn detail(&self, production: bool) -> Option<String> {
        match self {
            ApiError::Rejected(_) => None,
            ApiError::Internal(_) if production => None,
            ApiError::Storage(e) if production => e.remote_message().map(str::to_string),
            _ => Some(self.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ApiError {
    /// Render the error, masking internal detail when `production` is set.
    pub fn into_response_for(self, production: bool) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.headline(),
            detail: self.detail(production),
        };

        (status, Json(body)).into_response()
    }
}

/// Handlers without access to the config render masked.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_for(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            ApiError::from(UploadRejection::MissingFile).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(UploadRejection::UnsupportedContentType("image/png".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(UploadRejection::TooLarge { size: 2, max: 1 }).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_storage_errors_are_server_errors() {
        let err = ApiError::from(StorageError::BucketNotFound("webvid".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.headline(), "Upload failed: bucket_not_found");
    }

    #[test]
    fn test_production_keeps_only_remote_message() {
        let err = ApiError::from(StorageError::from_b2_response(
            400,
            r#"{"status":400,"code":"bad_request","message":"Sha1 did not match"}"#,
            true,
        ));
        assert_eq!(err.detail(true).as_deref(), Some("Sha1 did not match"));
        assert!(err.detail(false).unwrap().contains("bad_request"));

        let err = ApiError::from(StorageError::config_error("B2_APPLICATION_KEY not set"));
        assert_eq!(err.detail(true), None);
        assert!(err.detail(false).unwrap().contains("B2_APPLICATION_KEY"));
    }

}
