//! Bucket id resolution cache.

use tokio::sync::RwLock;

use crate::types::BucketEntry;

/// Process-lifetime cache of the resolved bucket id.
///
/// Cleared only when the service reports the id as unknown.
#[derive(Default)]
pub struct BucketCache {
    bucket_id: RwLock<Option<String>>,
}

impl BucketCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.bucket_id.read().await.clone()
    }

    pub async fn set(&self, bucket_id: String) {
        *self.bucket_id.write().await = Some(bucket_id);
    }

    pub async fn invalidate(&self) {
        *self.bucket_id.write().await = None;
    }
}

/// Exact-match scan of a bucket list by name.
pub fn find_bucket_id(buckets: &[BucketEntry], bucket_name: &str) -> Option<String> {
    buckets
        .iter()
        .find(|b| b.bucket_name == bucket_name)
        .map(|b| b.bucket_id.clone())
}
