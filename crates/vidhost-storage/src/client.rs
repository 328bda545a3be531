//! Backblaze B2 REST client.
//!
//! Production-grade client with:
//! - Session caching with single-flight refresh
//! - Bucket id resolution cached for the process lifetime
//! - One refresh-and-replay when the service reports an expired token
//! - HTTP client tuning (pooling, timeouts)
//! - Observability (tracing spans, metrics)

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::{debug, info, info_span, warn, Instrument};
use vidhost_models::{build_download_url_with_host, StoredObject};

use crate::bucket::{find_bucket_id, BucketCache};
use crate::config::B2Config;
use crate::error::{StorageError, StorageResult};
use crate::metrics::{record_reauth, record_request, record_uploaded_bytes};
use crate::session::{SessionCache, StorageSession};
use crate::types::{
    AuthorizeAccountResponse, BucketEntry, DeleteFileVersionRequest, DeleteFileVersionResponse,
    FileEntry, GetUploadUrlRequest, ListBucketsRequest, ListBucketsResponse, ListFileNamesRequest,
    ListFileNamesResponse, UploadFileResponse, UploadTarget,
};

/// Content type that asks B2 to infer the type from the file name.
pub const AUTO_CONTENT_TYPE: &str = "b2/x-auto";

const HEADER_FILE_NAME: &str = "X-Bz-File-Name";
const HEADER_CONTENT_SHA1: &str = "X-Bz-Content-Sha1";

// =============================================================================
// Client
// =============================================================================

/// Backblaze B2 client bound to one bucket.
///
/// Cloning is cheap; clones share the session and bucket caches.
#[derive(Clone)]
pub struct B2Client {
    http: Client,
    config: Arc<B2Config>,
    sessions: Arc<SessionCache>,
    bucket: Arc<BucketCache>,
}

impl B2Client {
    /// Create a new B2 client.
    pub fn new(config: B2Config) -> StorageResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.api_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("vidhost-storage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StorageError::Network)?;

        Ok(Self {
            http,
            config: Arc::new(config),
            sessions: Arc::new(SessionCache::new()),
            bucket: Arc::new(BucketCache::new()),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let config = B2Config::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &B2Config {
        &self.config
    }

    pub fn bucket_name(&self) -> &str {
        &self.config.bucket_name
    }

    /// Public download URL for an object in the configured bucket.
    pub fn download_url_for(&self, stored_name: &str) -> String {
        build_download_url_with_host(&self.config.download_host, &self.config.bucket_name, stored_name)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Authorize the account and overwrite the cached session.
    pub async fn authorize(&self) -> StorageResult<Arc<StorageSession>> {
        self.sessions.replace_with(|| self.request_session()).await
    }

    /// Cached session, authorizing on first use.
    pub async fn session(&self) -> StorageResult<Arc<StorageSession>> {
        self.sessions.get_or_authorize(|| self.request_session()).await
    }

    async fn request_session(&self) -> StorageResult<StorageSession> {
        let url = format!(
            "{}/b2api/v2/b2_authorize_account",
            self.config.auth_url.trim_end_matches('/')
        );

        self.execute_request("b2_authorize_account", async {
            info!(bucket = %self.config.bucket_name, "Authorizing with B2");

            let response = self
                .http
                .get(&url)
                .basic_auth(&self.config.application_key_id, Some(&self.config.application_key))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let err = StorageError::from_b2_response(status.as_u16(), &body, false);
                return Err(match (status.as_u16(), err) {
                    (400 | 403, StorageError::Service { code, message, .. }) => {
                        StorageError::Authentication { code, message }
                    }
                    (_, err) => err,
                });
            }

            let auth: AuthorizeAccountResponse = decode(response).await?;
            debug!(api_url = %auth.api_url, "B2 authorization successful");

            Ok(StorageSession::new(
                auth.account_id,
                auth.authorization_token,
                auth.api_url,
                auth.download_url,
            ))
        })
        .await
    }

    // =========================================================================
    // Buckets
    // =========================================================================

    /// List all buckets visible to the account.
    pub async fn list_buckets(&self) -> StorageResult<Vec<BucketEntry>> {
        let response: ListBucketsResponse = self
            .api_call("b2_list_buckets", |session| ListBucketsRequest {
                account_id: session.account_id.clone(),
            })
            .await?;
        Ok(response.buckets)
    }

    /// Resolve the configured bucket name to its id.
    ///
    /// The id is cached; later calls return it without a remote call.
    pub async fn resolve_bucket_id(&self) -> StorageResult<String> {
        if let Some(bucket_id) = self.bucket.get().await {
            return Ok(bucket_id);
        }

        let buckets = self.list_buckets().await?;
        let bucket_id = find_bucket_id(&buckets, &self.config.bucket_name)
            .ok_or_else(|| StorageError::BucketNotFound(self.config.bucket_name.clone()))?;

        debug!(bucket = %self.config.bucket_name, bucket_id = %bucket_id, "Resolved B2 bucket");
        self.bucket.set(bucket_id.clone()).await;
        Ok(bucket_id)
    }

    /// Round trip to B2 that bypasses both caches.
    ///
    /// Re-authorizes and looks the bucket up again, refreshing the cached
    /// session and bucket id on success.
    pub async fn check_connectivity(&self) -> StorageResult<String> {
        self.authorize().await?;
        let buckets = self.list_buckets().await?;
        let bucket_id = find_bucket_id(&buckets, &self.config.bucket_name)
            .ok_or_else(|| StorageError::BucketNotFound(self.config.bucket_name.clone()))?;
        self.bucket.set(bucket_id.clone()).await;
        Ok(bucket_id)
    }

    /// Forget the cached bucket id so the next call resolves it again.
    pub async fn invalidate_bucket(&self) {
        self.bucket.invalidate().await;
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Request a fresh one-time upload target for a bucket.
    pub async fn negotiate_upload_target(&self, bucket_id: &str) -> StorageResult<UploadTarget> {
        let result = self
            .api_call("b2_get_upload_url", |_| GetUploadUrlRequest {
                bucket_id: bucket_id.to_string(),
            })
            .await;
        self.check_bucket(result).await
    }

    /// Upload a whole file in a single request.
    ///
    /// `size_bytes` must equal the payload length. The payload's SHA-1 is
    /// sent so the service verifies integrity on receipt.
    pub async fn upload(
        &self,
        data: Bytes,
        file_name: &str,
        content_type: &str,
        size_bytes: u64,
    ) -> StorageResult<StoredObject> {
        if file_name.is_empty() {
            return Err(StorageError::invalid_request("file name cannot be empty"));
        }
        if data.len() as u64 != size_bytes {
            return Err(StorageError::invalid_request(format!(
                "declared size {} does not match payload of {} bytes",
                size_bytes,
                data.len()
            )));
        }

        let content_type = if content_type.trim().is_empty() {
            AUTO_CONTENT_TYPE
        } else {
            content_type
        };
        let content_sha1 = content_sha1(&data);

        info!(file_name = %file_name, size = size_bytes, content_type = %content_type, "Uploading file to B2");

        let bucket_id = self.resolve_bucket_id().await?;
        let target = self.negotiate_upload_target(&bucket_id).await?;

        let uploaded = match self
            .send_upload(&target, data.clone(), file_name, content_type, &content_sha1)
            .await
        {
            Err(e) if e.is_auth_expired() => {
                warn!(file_name = %file_name, "Upload token expired, negotiating a new target");
                record_reauth("b2_upload_file");
                let target = self.negotiate_upload_target(&bucket_id).await?;
                self.send_upload(&target, data, file_name, content_type, &content_sha1)
                    .await?
            }
            other => other?,
        };

        if uploaded.content_length != size_bytes {
            return Err(StorageError::invalid_response(format!(
                "service stored {} bytes, expected {}",
                uploaded.content_length, size_bytes
            )));
        }

        record_uploaded_bytes(uploaded.content_length);
        info!(file_name = %uploaded.file_name, file_id = %uploaded.file_id, "File uploaded to B2");

        Ok(StoredObject::new(
            uploaded.file_id,
            uploaded.file_name,
            uploaded.content_length,
            uploaded.upload_timestamp,
        ))
    }

    async fn send_upload(
        &self,
        target: &UploadTarget,
        data: Bytes,
        file_name: &str,
        content_type: &str,
        content_sha1: &str,
    ) -> StorageResult<UploadFileResponse> {
        let result = self
            .execute_request("b2_upload_file", async {
                let response = self
                    .http
                    .post(&target.upload_url)
                    .timeout(self.config.upload_timeout)
                    .header(AUTHORIZATION, &target.upload_authorization_token)
                    .header(HEADER_FILE_NAME, urlencoding::encode(file_name).as_ref())
                    .header(CONTENT_TYPE, content_type)
                    .header(HEADER_CONTENT_SHA1, content_sha1)
                    .body(data)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(error_from_response(response, true).await);
                }
                decode(response).await
            })
            .await;
        self.check_bucket(result).await
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List every stored object in the bucket, following page cursors.
    pub async fn list_stored_objects(&self) -> StorageResult<Vec<StoredObject>> {
        let bucket_id = self.resolve_bucket_id().await?;
        let mut objects = Vec::new();
        let mut start_file_name: Option<String> = None;
        let mut seen_cursors = HashSet::new();

        loop {
            let page = self
                .list_file_names_page(&bucket_id, start_file_name.clone())
                .await?;

            objects.extend(page.files.into_iter().filter_map(FileEntry::into_stored_object));

            match page.next_file_name {
                Some(next) if seen_cursors.insert(next.clone()) => {
                    start_file_name = Some(next);
                }
                Some(next) => {
                    warn!(cursor = %next, "B2 repeated a page cursor, stopping listing");
                    break;
                }
                None => break,
            }
        }

        debug!(count = objects.len(), "Listed stored objects");
        Ok(objects)
    }

    async fn list_file_names_page(
        &self,
        bucket_id: &str,
        start_file_name: Option<String>,
    ) -> StorageResult<ListFileNamesResponse> {
        let max_file_count = self.config.list_page_size;
        let result = self
            .api_call("b2_list_file_names", |_| ListFileNamesRequest {
                bucket_id: bucket_id.to_string(),
                max_file_count,
                start_file_name: start_file_name.clone(),
            })
            .await;
        self.check_bucket(result).await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete one version of a stored object.
    pub async fn delete_file(&self, stored_name: &str, object_id: &str) -> StorageResult<()> {
        let deleted: DeleteFileVersionResponse = self
            .api_call("b2_delete_file_version", |_| DeleteFileVersionRequest {
                file_name: stored_name.to_string(),
                file_id: object_id.to_string(),
            })
            .await?;

        info!(file_name = %stored_name, file_id = %deleted.file_id, "Deleted file from B2");
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// POST a JSON body to an API endpoint using the cached session.
    ///
    /// If the service reports an expired token, the session is refreshed
    /// and the call replayed exactly once.
    async fn api_call<B, R, F>(&self, operation: &'static str, build_body: F) -> StorageResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
        F: Fn(&StorageSession) -> B,
    {
        let session = self.session().await?;

        match self.post_api(operation, &session, &build_body(&*session)).await {
            Err(e) if e.is_auth_expired() => {
                warn!(
                    operation = operation,
                    session_age_secs = session.age_secs(),
                    "B2 session expired, re-authorizing"
                );
                record_reauth(operation);
                self.sessions.invalidate(&session).await;

                let session = self.session().await?;
                self.post_api(operation, &session, &build_body(&*session)).await
            }
            other => other,
        }
    }

    async fn post_api<B, R>(
        &self,
        operation: &'static str,
        session: &StorageSession,
        body: &B,
    ) -> StorageResult<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = session.endpoint(operation);

        self.execute_request(operation, async {
            let response = self
                .http
                .post(&url)
                .header(AUTHORIZATION, &session.authorization_token)
                .json(body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(error_from_response(response, false).await);
            }
            decode(response).await
        })
        .await
    }

    /// Drop the cached bucket id when the service no longer recognizes it.
    async fn check_bucket<T>(&self, result: StorageResult<T>) -> StorageResult<T> {
        if let Err(e) = &result {
            if e.is_bad_bucket() {
                warn!(bucket = %self.config.bucket_name, "B2 rejected cached bucket id, clearing it");
                self.bucket.invalidate().await;
            }
        }
        result
    }

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: std::future::Future<Output = StorageResult<T>>,
    {
        let span = info_span!("b2_request", operation = %operation, bucket = %self.config.bucket_name);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        if let Err(e) = &result {
            debug!(operation = operation, kind = e.kind(), error = %e, "B2 request failed");
        }

        result
    }
}

/// Hex-encoded SHA-1 of a payload.
pub fn content_sha1(data: &[u8]) -> String {
    format!("{:x}", Sha1::digest(data))
}

async fn error_from_response(response: Response, upload: bool) -> StorageError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StorageError::from_b2_response(status, &body, upload)
}

async fn decode<R: DeserializeOwned>(response: Response) -> StorageResult<R> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        let prefix: String = String::from_utf8_lossy(&body).chars().take(200).collect();
        StorageError::invalid_response(format!("{} (body prefix: {})", e, prefix))
    })
}
