//! Repository traits and their implementations.
//!
//! Every lookup and mutation takes the owner id alongside the entity id.
//! A row owned by someone else is indistinguishable from a missing row.
//! The only exception is [`FileRepository::find_unscoped`], which the
//! download path uses to tell `Forbidden` apart from `NotFound`.

pub mod file;
pub mod filter;
pub mod folder;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use drive_core::result::AppResult;
use drive_core::types::{PageRequest, PageResponse, SortField};
use drive_entity::{
    CreateFile, CreateFolder, File, Folder, LifecycleState, UpdateFile, UpdateFolder,
};

pub use file::PgFileRepository;
pub use filter::{NodeFilter, ParentFilter};
pub use folder::PgFolderRepository;
pub use memory::{MemoryFileRepository, MemoryFolderRepository};

/// Persistence for folder rows.
#[async_trait]
pub trait FolderRepository: Send + Sync + 'static {
    /// Insert a new active folder.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<Folder>>;

    /// List folders matching `filter`. `page = None` returns every match.
    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<Folder>>;

    /// Ids of direct child folders in any state.
    async fn child_ids(&self, parent_id: Uuid, owner_id: &str) -> AppResult<Vec<Uuid>>;

    /// Ids of `id` and every folder above it, in no particular order.
    /// Terminates on cyclic data.
    async fn ancestor_ids(&self, id: Uuid, owner_id: &str) -> AppResult<Vec<Uuid>>;

    /// Apply a rename and/or move. Returns `None` if the folder is not found.
    async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        data: &UpdateFolder,
    ) -> AppResult<Option<Folder>>;

    /// Move the folder to `target` if it is currently in the other state.
    /// Returns whether a row changed.
    async fn ensure_state(
        &self,
        id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Remove a trashed folder row. Active rows are never removed.
    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool>;
}

/// Persistence for file rows.
#[async_trait]
pub trait FileRepository: Send + Sync + 'static {
    /// Insert a new active file.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<File>>;

    /// Look a file up without the owner filter.
    async fn find_unscoped(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Look a file up by its blob id without the owner filter.
    async fn find_by_blob_unscoped(&self, blob_id: Uuid) -> AppResult<Option<File>>;

    /// List files matching `filter`. `page = None` returns every match.
    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<File>>;

    async fn update(&self, id: Uuid, owner_id: &str, data: &UpdateFile)
    -> AppResult<Option<File>>;

    /// Move the file to `target` if it is currently in the other state.
    async fn ensure_state(
        &self,
        id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Bulk form of [`ensure_state`](Self::ensure_state) for the direct
    /// files of one folder. Returns the number of rows changed.
    async fn ensure_state_in_folder(
        &self,
        parent_id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Remove a trashed file row. Active rows are never removed.
    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool>;
}
