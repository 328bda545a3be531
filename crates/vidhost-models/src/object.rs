//! Stored object model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A file durably held by the storage service.
///
/// The storage service is authoritative; nothing here is persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Service-assigned object id
    pub object_id: String,
    /// Name the object is stored under
    pub stored_name: String,
    /// Size in bytes
    pub content_length: u64,
    /// Upload time in epoch milliseconds
    pub upload_timestamp: i64,
}

impl StoredObject {
    pub fn new(
        object_id: impl Into<String>,
        stored_name: impl Into<String>,
        content_length: u64,
        upload_timestamp: i64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            stored_name: stored_name.into(),
            content_length,
            upload_timestamp,
        }
    }
}
