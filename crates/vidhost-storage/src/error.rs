//! Storage error types.

use thiserror::Error;

use crate::types::B2ErrorBody;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// B2 error codes meaning the session token must be refreshed.
const EXPIRED_TOKEN_CODES: [&str; 2] = ["expired_auth_token", "bad_auth_token"];

/// B2 error code for a bucket id the service no longer recognizes.
const BAD_BUCKET_CODE: &str = "bad_bucket_id";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("B2 authorization failed ({code}): {message}")]
    Authentication { code: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Bucket \"{0}\" not found")]
    BucketNotFound(String),

    #[error("Storage service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Upload failed ({code}): {message}")]
    Upload {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Build an error from a non-success B2 response.
    ///
    /// 401 always maps to `Authentication`; other statuses map to `Upload`
    /// for the upload endpoint and `Service` everywhere else.
    pub fn from_b2_response(status: u16, body: &str, upload: bool) -> Self {
        let parsed = serde_json::from_str::<B2ErrorBody>(body).ok();
        let (code, message) = match parsed {
            Some(err) => (err.code, err.message),
            None => ("unknown".to_string(), truncate(body, 200)),
        };

        if status == 401 {
            Self::Authentication { code, message }
        } else if upload {
            Self::Upload {
                status,
                code,
                message,
            }
        } else {
            Self::Service {
                status,
                code,
                message,
            }
        }
    }

    /// Short machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Config(_) => "configuration",
            StorageError::Authentication { .. } => "authentication",
            StorageError::Network(_) => "network",
            StorageError::BucketNotFound(_) => "bucket_not_found",
            StorageError::Service { .. } => "storage_service",
            StorageError::Upload { .. } => "upload",
            StorageError::InvalidRequest(_) => "invalid_request",
            StorageError::InvalidResponse(_) => "invalid_response",
        }
    }

    /// True if the session token expired and a fresh authorization may succeed.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            StorageError::Authentication { code, .. } if EXPIRED_TOKEN_CODES.contains(&code.as_str())
        )
    }

    /// True if the service no longer recognizes the bucket id.
    pub fn is_bad_bucket(&self) -> bool {
        matches!(
            self,
            StorageError::Service { code, .. } | StorageError::Upload { code, .. }
            if code == BAD_BUCKET_CODE
        )
    }

    /// True for timeouts and connection failures.
    pub fn is_network(&self) -> bool {
        matches!(self, StorageError::Network(_))
    }

    /// True if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, StorageError::Network(e) if e.is_timeout())
    }

    /// True if retrying later might succeed (network failures, 408, 429, 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Network(_) => true,
            StorageError::Service { status, .. } | StorageError::Upload { status, .. } => {
                matches!(*status, 408 | 429) || *status >= 500
            }
            _ => false,
        }
    }

    /// HTTP status associated with the error, when known.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StorageError::Authentication { .. } => Some(401),
            StorageError::BucketNotFound(_) => Some(404),
            StorageError::Service { status, .. } | StorageError::Upload { status, .. } => {
                Some(*status)
            }
            StorageError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message supplied by the storage service, when the service answered.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            StorageError::Authentication { message, .. }
            | StorageError::Service { message, .. }
            | StorageError::Upload { message, .. } => Some(message),
            _ => None,
        }
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
