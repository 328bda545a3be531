//! Video listing models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::download::build_download_url_with_host;
use crate::naming::{display_title, upload_date_label};
use crate::object::StoredObject;

/// View count of a video.
///
/// Views are not tracked, so listings carry `Unknown` (serialized as `null`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum ViewCount {
    #[default]
    Unknown,
    Known(u64),
}

impl From<Option<u64>> for ViewCount {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(n) => ViewCount::Known(n),
            None => ViewCount::Unknown,
        }
    }
}

impl From<ViewCount> for Option<u64> {
    fn from(value: ViewCount) -> Self {
        match value {
            ViewCount::Known(n) => Some(n),
            ViewCount::Unknown => None,
        }
    }
}

/// Display-ready projection of a stored video. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoListing {
    pub object_id: String,
    pub display_title: String,
    /// Name the object is stored under
    pub original_name: String,
    pub download_url: String,
    pub content_length: u64,
    /// Epoch milliseconds
    pub upload_timestamp: i64,
    /// `YYYY-MM-DD` (UTC)
    pub upload_date_label: String,
    #[schemars(with = "Option<u64>")]
    pub view_count: ViewCount,
}

impl VideoListing {
    /// Project a stored object into a listing entry.
    pub fn from_stored(object: StoredObject, bucket_name: &str, download_host: &str) -> Self {
        let download_url =
            build_download_url_with_host(download_host, bucket_name, &object.stored_name);

        Self {
            display_title: display_title(&object.stored_name),
            upload_date_label: upload_date_label(object.upload_timestamp),
            download_url,
            object_id: object.object_id,
            original_name: object.stored_name,
            content_length: object.content_length,
            upload_timestamp: object.upload_timestamp,
            view_count: ViewCount::Unknown,
        }
    }
}

/// Sort newest first. Stable, so equal timestamps keep input order.
pub fn sort_newest_first(listings: &mut [VideoListing]) {
    listings.sort_by(|a, b| b.upload_timestamp.cmp(&a.upload_timestamp));
}
