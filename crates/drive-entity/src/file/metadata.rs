//! Blob attributes exposed for a file without transferring content.

use chrono::{DateTime, Utc};
use drive_core::traits::BlobMeta;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub file_id: Uuid,
    pub blob_id: Uuid,
    pub filename: String,
    pub byte_length: u64,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner_id: String,
}

impl FileMetadata {
    pub fn from_blob(file_id: Uuid, meta: BlobMeta) -> Self {
        Self {
            file_id,
            blob_id: meta.id,
            filename: meta.filename,
            byte_length: meta.byte_length,
            content_type: meta.content_type,
            uploaded_at: meta.created_at,
            owner_id: meta.owner_id,
        }
    }
}
