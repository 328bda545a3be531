//! Upload preconditions and results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Upload size ceiling (100 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Media-type prefix an upload must carry.
pub const VIDEO_CONTENT_TYPE_PREFIX: &str = "video/";

/// Reasons an upload is refused before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Video file is required")]
    MissingFile,

    #[error("Title is required")]
    MissingTitle,

    #[error("Please select a valid video file (got content type '{0}')")]
    UnsupportedContentType(String),

    #[error("File size {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
}

/// Preconditions checked by the upload entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadConstraints {
    pub max_bytes: u64,
}

impl Default for UploadConstraints {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadConstraints {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Check content type and size. Content type is checked first.
    pub fn check(&self, content_type: &str, size_bytes: u64) -> Result<(), UploadRejection> {
        if !content_type
            .to_ascii_lowercase()
            .starts_with(VIDEO_CONTENT_TYPE_PREFIX)
        {
            return Err(UploadRejection::UnsupportedContentType(
                content_type.to_string(),
            ));
        }

        if size_bytes > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size: size_bytes,
                max: self.max_bytes,
            });
        }

        Ok(())
    }
}

/// User-supplied metadata accompanying an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
pub struct UploadMetadata {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
}

impl UploadMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Validate lengths, mapping failures to [`UploadRejection`].
    pub fn check(&self) -> Result<(), UploadRejection> {
        if self.title.trim().is_empty() {
            return Err(UploadRejection::MissingTitle);
        }
        self.validate()
            .map_err(|e| UploadRejection::InvalidMetadata(e.to_string()))
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedVideo {
    pub object_id: String,
    pub stored_file_name: String,
    pub download_url: String,
    pub content_length: u64,
    pub upload_timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_upload_bytes() {
        assert_eq!(MAX_UPLOAD_BYTES, 104_857_600);
    }

    #[test]
    fn test_accepts_video_within_limit() {
        let constraints = UploadConstraints::default();
        assert!(constraints.check("video/mp4", 1024).is_ok());
        assert!(constraints.check("Video/QuickTime", MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_non_video() {
        let constraints = UploadConstraints::default();
        assert_eq!(
            constraints.check("image/png", 10),
            Err(UploadRejection::UnsupportedContentType("image/png".into()))
        );
        assert!(constraints.check("", 10).is_err());
    }

    #[test]
    fn test_rejects_150_mib() {
        let constraints = UploadConstraints::default();
        let size = 150 * 1024 * 1024;
        assert_eq!(
            constraints.check("video/mp4", size),
            Err(UploadRejection::TooLarge {
                size,
                max: MAX_UPLOAD_BYTES
            })
        );
    }

    #[test]
    fn test_metadata_requires_title() {
        assert_eq!(
            UploadMetadata::new("   ", "").check(),
            Err(UploadRejection::MissingTitle)
        );
        assert!(UploadMetadata::new("Trip", "").check().is_ok());
    }

    #[test]
    fn test_metadata_rejects_long_title() {
        let result = UploadMetadata::new("x".repeat(201), "").check();
        assert!(matches!(result, Err(UploadRejection::InvalidMetadata(_))));
    }
}
