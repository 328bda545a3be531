//! Video catalog over the B2 client.
//!
//! Listing and lookup fail open: storage trouble reads as "no videos".
//! Uploading fails loud: every error reaches the caller.

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use vidhost_models::{
    is_video_file, sort_newest_first, stored_name_for, StoredObject, UploadedVideo, VideoListing,
};

use crate::client::B2Client;
use crate::error::StorageResult;
use crate::metrics::record_listing_failure;

/// Video-level operations on top of [`B2Client`].
#[derive(Clone)]
pub struct VideoCatalog {
    client: B2Client,
}

impl VideoCatalog {
    pub fn new(client: B2Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &B2Client {
        &self.client
    }

    /// All videos in the bucket, newest first.
    ///
    /// Never fails; any storage error is logged and yields an empty list.
    pub async fn list_videos(&self) -> Vec<VideoListing> {
        match self.client.list_stored_objects().await {
            Ok(objects) => listings_from_objects(
                objects,
                self.client.bucket_name(),
                &self.client.config().download_host,
            ),
            Err(e) => {
                warn!(
                    bucket = %self.client.bucket_name(),
                    kind = e.kind(),
                    error = %e,
                    "Video listing failed, returning empty list"
                );
                record_listing_failure(e.kind());
                Vec::new()
            }
        }
    }

    /// Look up one video by object id. Fails open like [`Self::list_videos`].
    pub async fn find_video(&self, object_id: &str) -> Option<VideoListing> {
        self.list_videos()
            .await
            .into_iter()
            .find(|listing| listing.object_id == object_id)
    }

    /// Store a video under a generated name and return where it lives.
    pub async fn upload_video(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: &str,
    ) -> StorageResult<UploadedVideo> {
        let stored_name = stored_name_for(original_name, Utc::now().timestamp_millis());
        let size_bytes = data.len() as u64;

        let stored = self
            .client
            .upload(data, &stored_name, content_type, size_bytes)
            .await?;

        info!(
            original_name = %original_name,
            stored_name = %stored.stored_name,
            object_id = %stored.object_id,
            "Video stored"
        );

        Ok(UploadedVideo {
            download_url: self.client.download_url_for(&stored.stored_name),
            object_id: stored.object_id,
            stored_file_name: stored.stored_name,
            content_length: stored.content_length,
            upload_timestamp: stored.upload_timestamp,
        })
    }
}

/// Keep video objects, project them into listings and sort newest first.
pub fn listings_from_objects(
    objects: Vec<StoredObject>,
    bucket_name: &str,
    download_host: &str,
) -> Vec<VideoListing> {
    let mut listings: Vec<VideoListing> = objects
        .into_iter()
        .filter(|object| is_video_file(&object.stored_name))
        .map(|object| VideoListing::from_stored(object, bucket_name, download_host))
        .collect();

    sort_newest_first(&mut listings);
    listings
}
