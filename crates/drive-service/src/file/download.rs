//! Streaming downloads.
//!
//! Downloads look the file up without the owner filter so that a file owned
//! by someone else answers `Forbidden` while a missing one answers `NotFound`.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::traits::storage::{BlobStore, ByteStream};
use drive_database::repositories::FileRepository;
use drive_entity::File;

use crate::context::RequestContext;

/// An open download: the file record plus its content stream.
pub struct Download {
    pub file: File,
    pub content_type: String,
    pub byte_length: u64,
    pub stream: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_id", &self.file.id)
            .field("content_type", &self.content_type)
            .field("byte_length", &self.byte_length)
            .finish_non_exhaustive()
    }
}

/// Opens file content for its owner.
#[derive(Clone)]
pub struct DownloadService {
    file_repo: Arc<dyn FileRepository>,
    blob_store: Arc<dyn BlobStore>,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService")
            .field("blob_store", &self.blob_store.provider_type())
            .finish_non_exhaustive()
    }
}

impl DownloadService {
    pub fn new(file_repo: Arc<dyn FileRepository>, blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            file_repo,
            blob_store,
        }
    }

    /// Download by file id.
    pub async fn download(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<Download> {
        let file = self.file_repo.find_unscoped(file_id).await?;
        self.open(ctx, file, || format!("File {file_id} not found"))
            .await
    }

    /// Download by blob id, the form used by generated links.
    pub async fn download_by_blob(&self, ctx: &RequestContext, blob_id: Uuid) -> AppResult<Download> {
        let file = self.file_repo.find_by_blob_unscoped(blob_id).await?;
        self.open(ctx, file, || format!("Blob {blob_id} not found"))
            .await
    }

    async fn open(
        &self,
        ctx: &RequestContext,
        file: Option<File>,
        missing: impl FnOnce() -> String,
    ) -> AppResult<Download> {
        let file = file.ok_or_else(|| AppError::not_found(missing()))?;
        if file.owner_id != ctx.owner_id {
            warn!(
                owner_id = %ctx.owner_id,
                file_id = %file.id,
                "Download refused for file of another owner"
            );
            return Err(AppError::forbidden("You do not have access to this file"));
        }

        let (meta, stream) = self.blob_store.get(file.blob_ref).await?;
        debug!(file_id = %file.id, blob_id = %meta.id, bytes = meta.byte_length, "Download opened");
        Ok(Download {
            content_type: file.mime_type.clone(),
            byte_length: meta.byte_length,
            file,
            stream,
        })
    }
}
