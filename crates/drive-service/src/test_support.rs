//! Fixtures shared by the service unit tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use drive_core::config::upload::UploadConfig;
use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::storage::BlobStore;
use drive_core::types::{PageRequest, PageResponse, SortField};
use drive_database::repositories::{
    FileRepository, FolderRepository, MemoryFileRepository, MemoryFolderRepository, NodeFilter,
};
use drive_entity::{CreateFile, File, LifecycleState, UpdateFile};
use drive_storage::MemoryBlobStore;

use crate::context::RequestContext;
use crate::file::{DownloadService, FileService, UploadService, UploadedFile};
use crate::folder::FolderService;
use crate::links::DownloadLinks;
use crate::listing::ListingService;

pub const BASE_URL: &str = "http://drive.test";

/// File repository that fails state changes for selected folders or files.
#[derive(Debug, Default)]
pub struct FlakyFileRepository {
    inner: MemoryFileRepository,
    failing: Mutex<HashSet<Uuid>>,
}

impl FlakyFileRepository {
    /// Make every write touching `id` (a file, or the folder holding files) fail.
    pub fn fail_on(&self, id: Uuid) {
        self.failing.lock().unwrap().insert(id);
    }

    fn check(&self, id: Uuid) -> AppResult<()> {
        if self.failing.lock().unwrap().contains(&id) {
            return Err(AppError::database(format!("injected failure for {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl FileRepository for FlakyFileRepository {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        if let Some(parent) = data.parent_id {
            self.check(parent)?;
        }
        self.inner.create(data).await
    }

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<File>> {
        self.inner.find_by_id(id, owner_id).await
    }

    async fn find_unscoped(&self, id: Uuid) -> AppResult<Option<File>> {
        self.inner.find_unscoped(id).await
    }

    async fn find_by_blob_unscoped(&self, blob_id: Uuid) -> AppResult<Option<File>> {
        self.inner.find_by_blob_unscoped(blob_id).await
    }

    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<File>> {
        self.inner.list(filter, sort, page).await
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        data: &UpdateFile,
    ) -> AppResult<Option<File>> {
        self.inner.update(id, owner_id, data).await
    }

    async fn ensure_state(
        &self,
        id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.check(id)?;
        self.inner.ensure_state(id, owner_id, target, at).await
    }

    async fn ensure_state_in_folder(
        &self,
        parent_id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.check(parent_id)?;
        self.inner
            .ensure_state_in_folder(parent_id, owner_id, target, at)
            .await
    }

    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool> {
        self.check(id)?;
        self.inner.delete_trashed(id, owner_id).await
    }
}

/// Every service wired over in-memory backends.
pub struct Harness {
    pub folder_repo: Arc<MemoryFolderRepository>,
    pub file_repo: Arc<FlakyFileRepository>,
    pub blobs: Arc<MemoryBlobStore>,
    pub folders: FolderService,
    pub files: FileService,
    pub uploads: UploadService,
    pub downloads: DownloadService,
    pub listing: ListingService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_upload_config(UploadConfig::default())
    }

    pub fn with_upload_config(upload: UploadConfig) -> Self {
        let folder_repo = Arc::new(MemoryFolderRepository::new());
        let file_repo = Arc::new(FlakyFileRepository::default());
        let blobs = Arc::new(MemoryBlobStore::new());

        let folder_dyn: Arc<dyn FolderRepository> = folder_repo.clone();
        let file_dyn: Arc<dyn FileRepository> = file_repo.clone();
        let blob_dyn: Arc<dyn BlobStore> = blobs.clone();
        let links = DownloadLinks::new(BASE_URL);

        Self {
            folders: FolderService::new(folder_dyn.clone(), file_dyn.clone(), blob_dyn.clone()),
            files: FileService::new(
                folder_dyn.clone(),
                file_dyn.clone(),
                blob_dyn.clone(),
                links.clone(),
            ),
            uploads: UploadService::new(
                folder_dyn.clone(),
                file_dyn.clone(),
                blob_dyn.clone(),
                upload,
                links,
            ),
            downloads: DownloadService::new(file_dyn.clone(), blob_dyn.clone()),
            listing: ListingService::new(folder_dyn, file_dyn),
            folder_repo,
            file_repo,
            blobs,
        }
    }
}

pub fn ctx(owner: &str) -> RequestContext {
    RequestContext::new(owner)
}

pub fn upload(name: &str, mime_type: &str, body: &'static str) -> UploadedFile {
    UploadedFile {
        original_name: name.to_string(),
        mime_type: mime_type.to_string(),
        data: Bytes::from_static(body.as_bytes()),
    }
}
