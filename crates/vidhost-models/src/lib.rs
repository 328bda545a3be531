//! Shared data models for the VidHost backend.
//!
//! This crate provides Serde-serializable types for:
//! - Stored objects as reported by the storage service
//! - Video listings derived from stored objects
//! - Upload constraints and upload results
//! - Stored-name generation and display-title derivation
//! - Public download URLs

pub mod download;
pub mod listing;
pub mod naming;
pub mod object;
pub mod upload;

// Re-export common types
pub use download::{build_download_url, build_download_url_with_host, DEFAULT_DOWNLOAD_HOST};
pub use listing::{sort_newest_first, VideoListing, ViewCount};
pub use naming::{
    display_title, is_video_file, sanitize_file_name, stored_name_for, upload_date_label,
    STORED_NAME_PREFIX, VIDEO_EXTENSIONS,
};
pub use object::StoredObject;
pub use upload::{
    UploadConstraints, UploadMetadata, UploadRejection, UploadedVideo, MAX_UPLOAD_BYTES,
    VIDEO_CONTENT_TYPE_PREFIX,
};
