//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::lifecycle::LifecycleState;

/// A folder in an owner's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Parent folder, or `None` for a root folder.
    pub parent_id: Option<Uuid>,
    /// Owner identity supplied by the auth gateway. Immutable.
    pub owner_id: String,
    /// Current lifecycle state.
    pub lifecycle_state: LifecycleState,
    /// When the folder was moved to trash.
    pub trashed_at: Option<DateTime<Utc>>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_trashed(&self) -> bool {
        self.lifecycle_state.is_trashed()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder name.
    pub name: String,
    /// The parent folder, or `None` for root.
    pub parent_id: Option<Uuid>,
    /// The owner.
    pub owner_id: String,
}

/// Changes applied by a folder update.
///
/// `parent_id` distinguishes "leave alone" (`None`) from "move to root"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolder {
    pub name: Option<String>,
    pub parent_id: Option<Option<Uuid>>,
}

impl UpdateFolder {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none()
    }
}
