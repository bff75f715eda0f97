//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Which blob store implementation holds file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderKind {
    /// Files under `root_path` on the local filesystem.
    #[default]
    Local,
    /// Process-local map.
    Memory,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub provider: StorageProviderKind,
    /// Root path for local blob storage.
    #[serde(default = "default_root_path")]
    pub root_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProviderKind::default(),
            root_path: default_root_path(),
        }
    }
}

fn default_root_path() -> String {
    "./data/blobs".to_string()
}
