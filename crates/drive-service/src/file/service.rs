//! File registry operations scoped to the requesting owner.

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
    CreateFile, File, FileMetadata, LifecycleState, Transition, TransitionOutcome, UpdateFile,
};

use crate::context::RequestContext;
use crate::folder::cascade::purge_file;
use crate::folder::service::require_folder;
use crate::links::DownloadLinks;
use crate::validation::validate_name;

/// Registers, moves and retires file records.
#[derive(Clone)]
pub struct FileService {
    folder_repo: Arc<dyn FolderRepository>,
    file_repo: Arc<dyn FileRepository>,
    blob_store: Arc<dyn BlobStore>,
    links: DownloadLinks,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

/// Request to register a file for an already stored blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRequest {
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub blob_ref: Uuid,
    pub mime_type: String,
    pub byte_size: i64,
}

/// Request to rename and/or move a file.
#[derive(Debug, Clone, Default)]
pub struct UpdateFileRequest {
    pub name: Option<String>,
    /// `Some(None)` moves the file to the root.
    pub parent_id: Option<Option<Uuid>>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        file_repo: Arc<dyn FileRepository>,
        blob_store: Arc<dyn BlobStore>,
        links: DownloadLinks,
    ) -> Self {
        Self {
            folder_repo,
            file_repo,
            blob_store,
            links,
        }
    }

    async fn require_file(&self, ctx: &RequestContext, id: Uuid) -> AppResult<File> {
        self.file_repo
            .find_by_id(id, &ctx.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Registers a file row pointing at a blob the owner uploaded earlier.
    pub async fn create(&self, ctx: &RequestContext, req: CreateFileRequest) -> AppResult<File> {
        let name = validate_name(&req.name, "File")?;
        if req.byte_size < 0 {
            return Err(AppError::validation("File size cannot be negative"));
        }
        if let Some(parent_id) = req.parent_id {
            require_folder(self.folder_repo.as_ref(), &ctx.owner_id, parent_id, "Parent folder")
                .await?;
        }

        let blob = self.blob_store.metadata(req.blob_ref).await?;
        if blob.owner_id != ctx.owner_id {
            return Err(AppError::not_found(format!("Blob {} not found", req.blob_ref)));
        }
        if let Some(existing) = self.file_repo.find_by_blob_unscoped(req.blob_ref).await? {
            return Err(AppError::validation(format!(
                "Blob {} already belongs to file {}",
                req.blob_ref, existing.id
            )));
        }

        let file = self
            .file_repo
            .create(&CreateFile {
                name,
                parent_id: req.parent_id,
                owner_id: ctx.owner_id.clone(),
                blob_ref: req.blob_ref,
                public_url: self.links.public_url(req.blob_ref, &req.mime_type),
                mime_type: req.mime_type,
                byte_size: req.byte_size,
            })
            .await?;

        info!(owner_id = %ctx.owner_id, file_id = %file.id, blob_id = %file.blob_ref, "File registered");
        Ok(file)
    }

    /// Gets a file by ID.
    pub async fn find_by_id(&self, ctx: &RequestContext, id: Uuid) -> AppResult<File> {
        self.require_file(ctx, id).await
    }

    /// Files directly inside a folder, in any state.
    pub async fn find_in_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Vec<File>> {
        require_folder(self.folder_repo.as_ref(), &ctx.owner_id, folder_id, "Folder").await?;
        let filter =
            NodeFilter::for_owner(&ctx.owner_id).in_parent(ParentFilter::Folder(folder_id));
        Ok(self
            .file_repo
            .list(&filter, SortField::asc(SortKey::CreatedAt), None)
            .await?
            .items)
    }

    /// Active files at the root. Without a page, every match is returned.
    pub async fn find_root(
        &self,
        ctx: &RequestContext,
        page: Option<PageRequest>,
        sort: SortField,
    ) -> AppResult<PageResponse<File>> {
        let filter = NodeFilter::for_owner(&ctx.owner_id)
            .in_parent(ParentFilter::Root)
            .with_state(LifecycleState::Active);
        self.file_repo.list(&filter, sort, page).await
    }

    /// Active files anywhere in the owner's tree.
    pub async fn find_all(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
        sort: SortField,
    ) -> AppResult<PageResponse<File>> {
        let filter = NodeFilter::for_owner(&ctx.owner_id).with_state(LifecycleState::Active);
        self.file_repo.list(&filter, sort, Some(page)).await
    }

    /// Case-insensitive substring search over active file names.
    pub async fn search_by_name(&self, ctx: &RequestContext, pattern: &str) -> AppResult<Vec<File>> {
        if pattern.trim().is_empty() {
            return Ok(Vec::new());
        }
        let filter = NodeFilter::for_owner(&ctx.owner_id)
            .with_state(LifecycleState::Active)
            .name_contains(pattern);
        Ok(self
            .file_repo
            .list(&filter, SortField::asc(SortKey::Name), None)
            .await?
            .items)
    }

    pub async fn list_trashed(&self, ctx: &RequestContext) -> AppResult<Vec<File>> {
        let filter = NodeFilter::for_owner(&ctx.owner_id).with_state(LifecycleState::Trashed);
        Ok(self
            .file_repo
            .list(&filter, SortField::desc(SortKey::UpdatedAt), None)
            .await?
            .items)
    }

    /// Attributes of the stored blob, without its content.
    pub async fn get_metadata(&self, ctx: &RequestContext, id: Uuid) -> AppResult<FileMetadata> {
        let file = self.require_file(ctx, id).await?;
        let meta = self.blob_store.metadata(file.blob_ref).await?;
        Ok(FileMetadata::from_blob(file.id, meta))
    }

    /// Renames and/or moves a file.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateFileRequest,
    ) -> AppResult<File> {
        let file = self.require_file(ctx, id).await?;

        let name = req
            .name
            .as_deref()
            .map(|name| validate_name(name, "File"))
            .transpose()?;

        let parent_id = match req.parent_id {
            Some(new_parent) if new_parent != file.parent_id => {
                if let Some(parent_id) = new_parent {
                    require_folder(
                        self.folder_repo.as_ref(),
                        &ctx.owner_id,
                        parent_id,
                        "Parent folder",
                    )
                    .await?;
                }
                Some(new_parent)
            }
            _ => None,
        };

        let updated = self
            .file_repo
            .update(id, &ctx.owner_id, &UpdateFile { name, parent_id })
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;

        info!(owner_id = %ctx.owner_id, file_id = %id, "File updated");
        Ok(updated)
    }

    /// Moves a file to the trash. A trashed file is returned unchanged.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<File> {
        let file = self.require_file(ctx, id).await?;
        self.transition(ctx, file, Transition::Trash).await
    }

    /// Brings a trashed file back.
    pub async fn restore(&self, ctx: &RequestContext, id: Uuid) -> AppResult<File> {
        let file = self.require_file(ctx, id).await?;
        self.transition(ctx, file, Transition::Restore).await
    }

    async fn transition(
        &self,
        ctx: &RequestContext,
        file: File,
        transition: Transition,
    ) -> AppResult<File> {
        let TransitionOutcome::To(target) = file.lifecycle_state.apply(transition)? else {
            return Ok(file);
        };

        self.file_repo
            .ensure_state(file.id, &ctx.owner_id, target, ctx.request_time)
            .await?;
        info!(owner_id = %ctx.owner_id, file_id = %file.id, state = %target, "File state changed");
        self.require_file(ctx, file.id).await
    }

    /// Permanently removes a trashed file and its blob.
    pub async fn hard_delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let file = self.require_file(ctx, id).await?;
        file.lifecycle_state.apply(Transition::Purge)?;

        let outcome = purge_file(self.file_repo.as_ref(), self.blob_store.as_ref(), &file).await?;
        if !outcome.row_removed {
            return Err(AppError::invalid_state(format!(
                "File {id} changed while it was being deleted"
            )));
        }
        info!(
            owner_id = %ctx.owner_id,
            file_id = %id,
            blob_removed = outcome.blob_removed,
            "File permanently deleted"
        );
        Ok(())
    }
}
