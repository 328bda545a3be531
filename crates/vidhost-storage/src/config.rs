//! B2 client configuration.

use std::fmt;
use std::time::Duration;

use vidhost_models::DEFAULT_DOWNLOAD_HOST;

use crate::error::{StorageError, StorageResult};

/// Identity endpoint host.
pub const DEFAULT_AUTH_URL: &str = "https://api.backblazeb2.com";

/// Bucket used when `B2_BUCKET_NAME` is unset.
pub const DEFAULT_BUCKET_NAME: &str = "webvid";

/// Timeout for authorization, bucket, negotiation and listing calls.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the upload call itself.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Page size for file-name listing.
pub const DEFAULT_LIST_PAGE_SIZE: u32 = 1000;

/// Largest page the service accepts.
pub const MAX_LIST_PAGE_SIZE: u32 = 10_000;

/// Configuration for the B2 client.
#[derive(Clone)]
pub struct B2Config {
    /// Application key id (account identifier)
    pub application_key_id: String,
    /// Application key (secret)
    pub application_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Identity endpoint host
    pub auth_url: String,
    /// Host used for public download URLs
    pub download_host: String,
    pub api_timeout: Duration,
    pub upload_timeout: Duration,
    pub connect_timeout: Duration,
    pub list_page_size: u32,
}

impl B2Config {
    /// Create config with default endpoints and timeouts.
    pub fn new(
        application_key_id: impl Into<String>,
        application_key: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            application_key_id: application_key_id.into(),
            application_key: application_key.into(),
            bucket_name: bucket_name.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            download_host: DEFAULT_DOWNLOAD_HOST.to_string(),
            api_timeout: DEFAULT_API_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let application_key_id = required_env("B2_APPLICATION_KEY_ID")?;
        let application_key = required_env("B2_APPLICATION_KEY")?;
        let bucket_name = std::env::var("B2_BUCKET_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BUCKET_NAME.to_string());

        let config = Self {
            application_key_id,
            application_key,
            bucket_name,
            auth_url: std::env::var("B2_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            download_host: std::env::var("B2_PUBLIC_DOWNLOAD_HOST")
                .unwrap_or_else(|_| DEFAULT_DOWNLOAD_HOST.to_string()),
            api_timeout: env_secs("B2_API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT),
            upload_timeout: env_secs("B2_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT),
            connect_timeout: env_secs("B2_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT),
            list_page_size: std::env::var("B2_LIST_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(DEFAULT_LIST_PAGE_SIZE)
                .clamp(1, MAX_LIST_PAGE_SIZE),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that credentials are present and endpoint URLs parse.
    pub fn validate(&self) -> StorageResult<()> {
        if self.application_key_id.trim().is_empty() || self.application_key.trim().is_empty() {
            return Err(StorageError::config_error("B2 credentials cannot be empty"));
        }
        if self.bucket_name.trim().is_empty() {
            return Err(StorageError::config_error("B2 bucket name cannot be empty"));
        }
        for (name, value) in [("B2_AUTH_URL", &self.auth_url), ("B2_PUBLIC_DOWNLOAD_HOST", &self.download_host)] {
            url::Url::parse(value)
                .map_err(|e| StorageError::config_error(format!("{} is not a valid URL: {}", name, e)))?;
        }
        Ok(())
    }
}

impl fmt::Debug for B2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("B2Config")
            .field("application_key_id", &self.application_key_id)
            .field("application_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("auth_url", &self.auth_url)
            .field("download_host", &self.download_host)
            .field("api_timeout", &self.api_timeout)
            .field("upload_timeout", &self.upload_timeout)
            .field("list_page_size", &self.list_page_size)
            .finish()
    }
}

fn required_env(name: &str) -> StorageResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(StorageError::config_error(format!("{} cannot be empty", name))),
        Err(_) => Err(StorageError::config_error(format!("{} not set", name))),
    }
}

fn env_secs(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
