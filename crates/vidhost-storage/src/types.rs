//! B2 native API (v2) wire types.

use std::fmt;

use serde::{Deserialize, Serialize};
use vidhost_models::StoredObject;

/// Error body returned by every B2 endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct B2ErrorBody {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Response from `b2_authorize_account`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorizeAccountResponse {
    pub account_id: String,
    pub authorization_token: String,
    pub api_url: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListBucketsRequest {
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBucketsResponse {
    #[serde(default)]
    pub buckets: Vec<BucketEntry>,
}

/// A bucket visible to the account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketEntry {
    pub bucket_id: String,
    pub bucket_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetUploadUrlRequest {
    pub bucket_id: String,
}

/// One-time upload endpoint and token, valid for a single upload.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    pub upload_url: String,
    #[serde(rename = "authorizationToken")]
    pub upload_authorization_token: String,
}

impl fmt::Debug for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadTarget")
            .field("upload_url", &self.upload_url)
            .field("upload_authorization_token", &"<redacted>")
            .finish()
    }
}

/// Response from the upload endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadFileResponse {
    pub file_id: String,
    pub file_name: String,
    pub content_length: u64,
    pub upload_timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListFileNamesRequest {
    pub bucket_id: String,
    pub max_file_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListFileNamesResponse {
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub next_file_name: Option<String>,
}

/// One entry of a file-name listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileEntry {
    #[serde(default)]
    pub file_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub content_length: u64,
    #[serde(default)]
    pub upload_timestamp: i64,
    #[serde(default = "default_action")]
    pub action: String,
}

fn default_action() -> String {
    "upload".to_string()
}

impl FileEntry {
    /// Only `upload` entries are live objects; `folder`, `hide` and `start` are not.
    pub fn into_stored_object(self) -> Option<StoredObject> {
        if self.action != "upload" {
            return None;
        }
        let file_id = self.file_id?;
        Some(StoredObject::new(
            file_id,
            self.file_name,
            self.content_length,
            self.upload_timestamp,
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteFileVersionRequest {
    pub file_name: String,
    pub file_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteFileVersionResponse {
    pub file_id: String,
}
