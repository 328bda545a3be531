//! Application state.

use std::sync::Arc;

use tokio::sync::Semaphore;
use vidhost_storage::{B2Client, StorageResult, VideoCatalog};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<B2Client>,
    pub catalog: VideoCatalog,
    /// Bounds uploads running against storage at once
    pub upload_slots: Arc<Semaphore>,
}

impl AppState {
    /// Create new application state with a storage client from the environment.
    pub fn new(config: ApiConfig) -> StorageResult<Self> {
        let storage = B2Client::from_env()?;
        Ok(Self::with_client(config, storage))
    }

    /// Create application state around an existing storage client.
    pub fn with_client(config: ApiConfig, storage: B2Client) -> Self {
        let upload_slots = Arc::new(Semaphore::new(config.max_concurrent_uploads.max(1)));
        let catalog = VideoCatalog::new(storage.clone());

        Self {
            config,
            storage: Arc::new(storage),
            catalog,
            upload_slots,
        }
    }
}
