//! Upload validation and registration.
//!
//! A single upload fails as a whole. A batch is checked once at the request
//! level (file count, parent folder) and then file by file: a rejected or
//! failed item is reported in the manifest and the rest of the batch goes on.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use drive_core::config::upload::UploadConfig;
use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::storage::{BlobStore, NewBlob};
use drive_database::repositories::{FileRepository, FolderRepository};
use drive_entity::{CreateFile, File};
use drive_storage::mime;

use crate::context::RequestContext;
use crate::folder::service::require_folder;
use crate::links::DownloadLinks;
use crate::validation::{extension_of, validate_name};

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    /// MIME type declared by the client.
    pub mime_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of a single upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Id of the registered file.
    pub id: Uuid,
    pub blob_id: Uuid,
    /// Download URL keyed by the blob id.
    pub url: String,
    pub file: File,
}

/// A stored blob not yet registered as a file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobReceipt {
    /// Blob id, passed as `blobRef` when registering the file.
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub mime_type: String,
    pub byte_size: u64,
}

/// Why a batch item was not stored.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestError {
    pub kind: ErrorKind,
    pub message: String,
}

/// One line of a batch upload manifest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<Uuid>,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub owner_id: String,
    /// Set for images, which are served inline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ManifestError>,
}

/// Per-file outcome of a batch upload, in request order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadManifest {
    pub files: Vec<ManifestEntry>,
    pub stored: usize,
    pub rejected: usize,
}

/// Validates uploads, stores their content and registers the file rows.
#[derive(Clone)]
pub struct UploadService {
    folder_repo: Arc<dyn FolderRepository>,
    file_repo: Arc<dyn FileRepository>,
    blob_store: Arc<dyn BlobStore>,
    config: UploadConfig,
    links: DownloadLinks,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl UploadService {
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        file_repo: Arc<dyn FileRepository>,
        blob_store: Arc<dyn BlobStore>,
        config: UploadConfig,
        links: DownloadLinks,
    ) -> Self {
        Self {
            folder_repo,
            file_repo,
            blob_store,
            config,
            links,
        }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Store one file under the single-file size limit.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        file: UploadedFile,
    ) -> AppResult<UploadReceipt> {
        self.require_parent(ctx, parent_id).await?;
        let mime_type = self.validate(&file, self.config.max_file_size_bytes)?;
        let stored = self.store(ctx, parent_id, &file, mime_type).await?;

        Ok(UploadReceipt {
            id: stored.id,
            blob_id: stored.blob_ref,
            url: self.links.blob_url(stored.blob_ref),
            file: stored,
        })
    }

    /// Store content under the single-file limit without registering a file.
    /// The blob is registered later through the file registry.
    pub async fn upload_blob(
        &self,
        ctx: &RequestContext,
        file: UploadedFile,
    ) -> AppResult<BlobReceipt> {
        let mime_type = self.validate(&file, self.config.max_file_size_bytes)?;
        let name = validate_name(&file.original_name, "File")?;
        let blob = self
            .blob_store
            .put_bytes(
                NewBlob {
                    filename: name,
                    content_type: mime_type,
                    owner_id: ctx.owner_id.clone(),
                },
                file.data,
            )
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            blob_id = %blob.id,
            bytes = blob.byte_length,
            "Blob uploaded"
        );
        Ok(BlobReceipt {
            id: blob.id,
            url: self.links.blob_url(blob.id),
            filename: blob.filename,
            mime_type: blob.content_type,
            byte_size: blob.byte_length,
        })
    }

    /// Store a batch under the per-file batch limit.
    pub async fn upload_many(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        files: Vec<UploadedFile>,
    ) -> AppResult<UploadManifest> {
        if files.is_empty() {
            return Err(AppError::validation("No files were uploaded"));
        }
        if files.len() > self.config.max_batch_files {
            return Err(AppError::validation(format!(
                "At most {} files can be uploaded at once",
                self.config.max_batch_files
            )));
        }
        self.require_parent(ctx, parent_id).await?;

        let mut manifest = UploadManifest {
            files: Vec::with_capacity(files.len()),
            stored: 0,
            rejected: 0,
        };

        for file in files {
            let outcome = match self.validate(&file, self.config.max_batch_file_size_bytes) {
                Ok(mime_type) => self.store(ctx, parent_id, &file, mime_type).await,
                Err(e) => Err(e),
            };

            let entry = match outcome {
                Ok(stored) => {
                    manifest.stored += 1;
                    ManifestEntry {
                        file_id: Some(stored.id),
                        original_name: file.original_name,
                        mime_type: stored.mime_type,
                        size: file.data.len() as u64,
                        owner_id: ctx.owner_id.clone(),
                        url: stored.public_url,
                        error: None,
                    }
                }
                Err(e) => {
                    manifest.rejected += 1;
                    warn!(
                        owner_id = %ctx.owner_id,
                        name = %file.original_name,
                        error = %e,
                        "Batch upload item rejected"
                    );
                    ManifestEntry {
                        file_id: None,
                        size: file.size(),
                        original_name: file.original_name,
                        mime_type: file.mime_type,
                        owner_id: ctx.owner_id.clone(),
                        url: None,
                        error: Some(ManifestError {
                            kind: e.kind,
                            message: e.message,
                        }),
                    }
                }
            };
            manifest.files.push(entry);
        }

        info!(
            owner_id = %ctx.owner_id,
            stored = manifest.stored,
            rejected = manifest.rejected,
            "Batch upload finished"
        );
        Ok(manifest)
    }

    async fn require_parent(&self, ctx: &RequestContext, parent_id: Option<Uuid>) -> AppResult<()> {
        if let Some(parent_id) = parent_id {
            require_folder(self.folder_repo.as_ref(), &ctx.owner_id, parent_id, "Parent folder")
                .await?;
        }
        Ok(())
    }

    /// Check name, extension, MIME type and size. Returns the MIME type to store.
    fn validate(&self, file: &UploadedFile, max_bytes: u64) -> AppResult<String> {
        validate_name(&file.original_name, "File")?;

        let extension = extension_of(&file.original_name)
            .filter(|ext| self.config.allows_extension(ext))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "File type of '{}' is not allowed",
                    file.original_name
                ))
            })?;

        let canonical = mime::resolve(&extension, &file.mime_type).ok_or_else(|| {
            AppError::validation(format!(
                "MIME type '{}' does not match extension .{extension}",
                file.mime_type
            ))
        })?;

        if file.data.is_empty() {
            return Err(AppError::validation(format!(
                "File '{}' is empty",
                file.original_name
            )));
        }
        if file.size() > max_bytes {
            return Err(AppError::validation(format!(
                "File '{}' exceeds the {} byte limit",
                file.original_name, max_bytes
            )));
        }

        // Keep what the client declared unless it said nothing useful.
        let declared = mime::essence(&file.mime_type);
        if declared.is_empty() || declared == "application/octet-stream" {
            Ok(canonical.to_string())
        } else {
            Ok(declared)
        }
    }

    /// Put the blob, then register the row. A failed registration removes the blob.
    async fn store(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        file: &UploadedFile,
        mime_type: String,
    ) -> AppResult<File> {
        let name = validate_name(&file.original_name, "File")?;
        let blob = self
            .blob_store
            .put_bytes(
                NewBlob {
                    filename: name.clone(),
                    content_type: mime_type.clone(),
                    owner_id: ctx.owner_id.clone(),
                },
                file.data.clone(),
            )
            .await?;

        let created = self
            .file_repo
            .create(&CreateFile {
                name,
                parent_id,
                owner_id: ctx.owner_id.clone(),
                blob_ref: blob.id,
                public_url: self.links.public_url(blob.id, &mime_type),
                mime_type,
                byte_size: blob.byte_length as i64,
            })
            .await;

        match created {
            Ok(stored) => {
                info!(
                    owner_id = %ctx.owner_id,
                    file_id = %stored.id,
                    blob_id = %blob.id,
                    bytes = blob.byte_length,
                    "File uploaded"
                );
                Ok(stored)
            }
            Err(e) => {
                if let Err(cleanup) = self.blob_store.delete(blob.id).await {
                    warn!(blob_id = %blob.id, error = %cleanup, "Failed to remove orphaned blob");
                }
                Err(e)
            }
        }
    }
}
