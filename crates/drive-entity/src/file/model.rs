//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::lifecycle::LifecycleState;

/// A file record. The content lives in the blob store under `blob_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file name (including extension).
    pub name: String,
    /// Containing folder, or `None` for the owner's root.
    pub parent_id: Option<Uuid>,
    /// The file owner.
    pub owner_id: String,
    /// Id of the blob holding the content.
    pub blob_ref: Uuid,
    /// MIME type of the content.
    pub mime_type: String,
    /// Content size in bytes.
    pub byte_size: i64,
    /// Link for inline display, only set for images.
    pub public_url: Option<String>,
    /// Current lifecycle state.
    pub lifecycle_state: LifecycleState,
    /// When the file was moved to trash.
    pub trashed_at: Option<DateTime<Utc>>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_trashed(&self) -> bool {
        self.lifecycle_state.is_trashed()
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The file name.
    pub name: String,
    /// The folder to place the file in, or `None` for root.
    pub parent_id: Option<Uuid>,
    /// The file owner.
    pub owner_id: String,
    /// Blob holding the content.
    pub blob_ref: Uuid,
    /// MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub byte_size: i64,
    /// Public link for images.
    pub public_url: Option<String>,
}

/// Changes applied by a file update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFile {
    pub name: Option<String>,
    /// `Some(None)` moves the file to the root.
    pub parent_id: Option<Option<Uuid>>,
}
