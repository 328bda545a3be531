//! Session caching for B2 authorization.
//!
//! Provides a thread-safe, async-aware session cache with:
//! - Fast path for readers while a session is cached
//! - Single-flight refresh so concurrent callers never re-authorize twice
//! - Compare-before-invalidate so a stale caller cannot drop a fresher session

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StorageResult;

// =============================================================================
// Session
// =============================================================================

/// Result of a successful account authorization.
#[derive(Clone)]
pub struct StorageSession {
    pub account_id: String,
    pub authorization_token: String,
    /// Base URL for all API calls other than authorization
    pub api_url: String,
    /// Base URL for downloads
    pub download_url: String,
    obtained_at: Instant,
}

impl StorageSession {
    pub fn new(
        account_id: impl Into<String>,
        authorization_token: impl Into<String>,
        api_url: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            authorization_token: authorization_token.into(),
            api_url: api_url.into(),
            download_url: download_url.into(),
            obtained_at: Instant::now(),
        }
    }

    /// Build a full API endpoint URL, e.g. `b2_list_buckets`.
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/b2api/v2/{}", self.api_url.trim_end_matches('/'), name)
    }

    /// Seconds since this session was obtained.
    pub fn age_secs(&self) -> u64 {
        self.obtained_at.elapsed().as_secs()
    }
}

impl fmt::Debug for StorageSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSession")
            .field("account_id", &self.account_id)
            .field("authorization_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("download_url", &self.download_url)
            .finish()
    }
}

// =============================================================================
// Session Cache
// =============================================================================

/// Thread-safe session cache with single-flight refresh.
///
/// Sessions carry no expiry; one is trusted until the service rejects it,
/// at which point the caller invalidates it and asks for a new one.
#[derive(Default)]
pub struct SessionCache {
    cache: RwLock<Option<Arc<StorageSession>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently cached session, if any.
    pub async fn current(&self) -> Option<Arc<StorageSession>> {
        self.cache.read().await.clone()
    }

    /// Return the cached session, authorizing when none is cached.
    ///
    /// - Fast path: read lock, return cached session
    /// - Slow path: write lock, double-check, then run `authorize`
    pub async fn get_or_authorize<F, Fut>(&self, authorize: F) -> StorageResult<Arc<StorageSession>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StorageResult<StorageSession>>,
    {
        {
            let cache = self.cache.read().await;
            if let Some(session) = cache.as_ref() {
                return Ok(Arc::clone(session));
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have authorized while we waited
        if let Some(session) = cache.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(authorize().await?);
        *cache = Some(Arc::clone(&session));
        debug!("Cached new B2 session");
        Ok(session)
    }

    /// Authorize unconditionally and overwrite the cached session.
    ///
    /// On failure the previous session (if any) is left in place.
    pub async fn replace_with<F, Fut>(&self, authorize: F) -> StorageResult<Arc<StorageSession>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StorageResult<StorageSession>>,
    {
        let mut cache = self.cache.write().await;
        let session = Arc::new(authorize().await?);
        *cache = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Drop the cached session if it is still the one the caller saw fail.
    ///
    /// Returns true if the cache was cleared.
    pub async fn invalidate(&self, stale: &StorageSession) -> bool {
        let mut cache = self.cache.write().await;
        let matches = cache
            .as_ref()
            .is_some_and(|current| current.authorization_token == stale.authorization_token);

        if matches {
            *cache = None;
        }
        matches
    }
}

// =============================================================================
// Tests
// =============================================================================
