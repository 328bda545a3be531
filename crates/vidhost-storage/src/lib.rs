//! Backblaze B2 storage client.
//!
//! This crate provides:
//! - Account authorization with a shared, single-flight session cache
//! - Bucket id resolution cached for the process lifetime
//! - Fresh upload-target negotiation and whole-file uploads with SHA-1 checks
//! - Paginated object listing and video classification
//! - A fail-open video catalog for listing pages

pub mod bucket;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod session;
pub mod types;


pub use catalog::{listings_from_objects, VideoCatalog};
pub use client::{content_sha1, B2Client, AUTO_CONTENT_TYPE};
pub use config::B2Config;
pub use error::{StorageError, StorageResult};
pub use session::{SessionCache, StorageSession};
pub use types::{BucketEntry, UploadTarget};
