//! # drive-storage
//!
//! Blob store providers for Drive: a local filesystem store with JSON
//! metadata sidecars and an in-memory store, plus the MIME table used by
//! upload validation.

pub mod mime;
pub mod providers;

use std::sync::Arc;

use drive_core::config::storage::{StorageConfig, StorageProviderKind};
use drive_core::result::AppResult;
use drive_core::traits::BlobStore;

pub use providers::local::LocalBlobStore;
pub use providers::memory::MemoryBlobStore;

/// Build the blob store selected by configuration.
pub async fn open_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.provider {
        StorageProviderKind::Local => Arc::new(LocalBlobStore::new(&config.root_path).await?),
        StorageProviderKind::Memory => Arc::new(MemoryBlobStore::new()),
    };
    tracing::info!(provider = store.provider_type(), "Blob store ready");
    Ok(store)
}
