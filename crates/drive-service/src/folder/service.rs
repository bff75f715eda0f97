//! Folder CRUD and lifecycle operations scoped to the requesting owner.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::storage::BlobStore;
use drive_core::types::{PageRequest, PageResponse, SortField, SortKey};
use drive_database::repositories::{FileRepository, FolderRepository, NodeFilter, ParentFilter};
use drive_entity::{
    CreateFolder, Folder, FolderContents, LifecycleState, Transition, UpdateFolder,
};

use crate::context::RequestContext;
use crate::validation::validate_name;

use super::cascade::{Cascade, CascadeReport};

/// Manages the folder tree of each owner.
#[derive(Clone)]
pub struct FolderService {
    folder_repo: Arc<dyn FolderRepository>,
    file_repo: Arc<dyn FileRepository>,
    blob_store: Arc<dyn BlobStore>,
}

impl std::fmt::Debug for FolderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderService")
            .field("blob_store", &self.blob_store.provider_type())
            .finish_non_exhaustive()
    }
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    /// Parent folder ID (None for root-level).
    pub parent_id: Option<Uuid>,
}

/// Request to rename and/or move a folder.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    /// `Some(None)` moves the folder to the root.
    pub parent_id: Option<Option<Uuid>>,
}

/// Look up a folder the owner can address, or fail with `NotFound`.
pub(crate) async fn require_folder(
    folders: &dyn FolderRepository,
    owner_id: &str,
    id: Uuid,
    what: &str,
) -> AppResult<Folder> {
    folders
        .find_by_id(id, owner_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{what} {id} not found")))
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        file_repo: Arc<dyn FileRepository>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            folder_repo,
            file_repo,
            blob_store,
        }
    }

    fn cascade<'a>(&'a self, ctx: &'a RequestContext) -> Cascade<'a> {
        Cascade {
            folders: self.folder_repo.as_ref(),
            files: self.file_repo.as_ref(),
            blobs: self.blob_store.as_ref(),
            owner_id: &ctx.owner_id,
            at: ctx.request_time,
        }
    }

    /// Creates a new active folder, at the root or under `parent_id`.
    pub async fn create(&self, ctx: &RequestContext, req: CreateFolderRequest) -> AppResult<Folder> {
        let name = validate_name(&req.name, "Folder")?;
        if let Some(parent_id) = req.parent_id {
            require_folder(self.folder_repo.as_ref(), &ctx.owner_id, parent_id, "Parent folder")
                .await?;
        }

        let folder = self
            .folder_repo
            .create(&CreateFolder {
                name,
                parent_id: req.parent_id,
                owner_id: ctx.owner_id.clone(),
            })
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            "Folder created"
        );
        Ok(folder)
    }

    /// Gets a folder by ID.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Folder> {
        require_folder(self.folder_repo.as_ref(), &ctx.owner_id, id, "Folder").await
    }

    /// Direct child folders and files, in any state.
    pub async fn contents(&self, ctx: &RequestContext, id: Uuid) -> AppResult<FolderContents> {
        self.get(ctx, id).await?;

        let filter = NodeFilter::for_owner(&ctx.owner_id).in_parent(ParentFilter::Folder(id));
        let sort = SortField::asc(SortKey::CreatedAt);
        let folders = self.folder_repo.list(&filter, sort, None).await?.items;
        let files = self.file_repo.list(&filter, sort, None).await?.items;
        Ok(FolderContents { folders, files })
    }

    /// Renames and/or moves a folder.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateFolderRequest,
    ) -> AppResult<Folder> {
        let folder = self.get(ctx, id).await?;

        let name = req
            .name
            .as_deref()
            .map(|name| validate_name(name, "Folder"))
            .transpose()?;

        let parent_id = match req.parent_id {
            Some(new_parent) if new_parent != folder.parent_id => {
                if let Some(parent_id) = new_parent {
                    self.check_move_target(ctx, id, parent_id).await?;
                }
                Some(new_parent)
            }
            _ => None,
        };

        let changes = UpdateFolder { name, parent_id };
        let updated = self
            .folder_repo
            .update(id, &ctx.owner_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        info!(owner_id = %ctx.owner_id, folder_id = %id, "Folder updated");
        Ok(updated)
    }

    /// The new parent must exist for the owner and lie outside the moved subtree.
    async fn check_move_target(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        parent_id: Uuid,
    ) -> AppResult<()> {
        if parent_id == id {
            return Err(AppError::validation("A folder cannot be its own parent"));
        }
        require_folder(self.folder_repo.as_ref(), &ctx.owner_id, parent_id, "Parent folder")
            .await?;

        let ancestors = self.folder_repo.ancestor_ids(parent_id, &ctx.owner_id).await?;
        if ancestors.contains(&id) {
            return Err(AppError::validation(
                "Cannot move a folder into one of its own subfolders",
            ));
        }
        Ok(())
    }

    /// Moves the folder and everything beneath it to the trash.
    ///
    /// Repeating the delete on a trashed folder only finishes whatever an
    /// earlier partial cascade left active; `trashed_at` of rows already in
    /// the trash is kept.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<CascadeReport> {
        let folder = self.get(ctx, id).await?;
        folder.lifecycle_state.apply(Transition::Trash)?;

        let report = self.cascade(ctx).trash(id).await;
        info!(
            owner_id = %ctx.owner_id,
            folder_id = %id,
            folders = report.folders_changed,
            files = report.files_changed,
            failures = report.failures.len(),
            "Folder moved to trash"
        );
        Ok(report)
    }

    /// Brings a trashed folder and its subtree back.
    pub async fn restore(&self, ctx: &RequestContext, id: Uuid) -> AppResult<CascadeReport> {
        let folder = self.get(ctx, id).await?;
        folder.lifecycle_state.apply(Transition::Restore)?;

        let report = self.cascade(ctx).restore(id).await;
        info!(
            owner_id = %ctx.owner_id,
            folder_id = %id,
            folders = report.folders_changed,
            files = report.files_changed,
            failures = report.failures.len(),
            "Folder restored"
        );
        Ok(report)
    }

    /// Permanently removes a trashed folder, its files and their blobs.
    pub async fn hard_delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<CascadeReport> {
        let folder = self.get(ctx, id).await?;
        folder.lifecycle_state.apply(Transition::Purge)?;

        let report = self.cascade(ctx).purge(id).await;
        info!(
            owner_id = %ctx.owner_id,
            folder_id = %id,
            folders = report.folders_changed,
            files = report.files_changed,
            blobs = report.blobs_purged,
            failures = report.failures.len(),
            "Folder permanently deleted"
        );
        Ok(report)
    }

    /// Active folders at the owner's root, one page at a time.
    pub async fn list_roots(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        sort: SortField,
    ) -> AppResult<PageResponse<Folder>> {
        let filter = NodeFilter::for_owner(&ctx.owner_id)
            .in_parent(ParentFilter::Root)
            .with_state(LifecycleState::Active);
        self.folder_repo.list(&filter, sort, Some(page)).await
    }

    /// Every trashed folder of the owner, most recently changed first.
    pub async fn list_trashed(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        let filter = NodeFilter::for_owner(&ctx.owner_id).with_state(LifecycleState::Trashed);
        Ok(self
            .folder_repo
            .list(&filter, SortField::desc(SortKey::UpdatedAt), None)
            .await?
            .items)
    }
}
