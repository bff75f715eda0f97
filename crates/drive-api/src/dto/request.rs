//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use drive_core::error::AppError;

/// Run `validator` rules, mapping failures to a validation error.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderBody {
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub name: String,
    pub parent_id: Option<Uuid>,
}

/// Rename and/or move request body, for folders and files alike.
///
/// `"parentId": null` moves the node to the root; leaving the field out
/// keeps the current parent.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeBody {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub parent_id: Option<Option<Uuid>>,
}

/// Register a file for an already stored blob.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileBody {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub blob_ref: Uuid,
    #[validate(length(min = 1))]
    pub mime_type: String,
    #[validate(range(min = 0))]
    pub byte_size: i64,
}

/// `GET /api/files/search?name=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

/// Location and filter part of `GET /api/drive/contents`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFilter {
    pub parent_id: Option<Uuid>,
    pub search: Option<String>,
}
