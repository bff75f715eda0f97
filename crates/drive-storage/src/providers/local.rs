//! Local filesystem blob store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<first two hex digits of id>/<id>.blob   content
//! <root>/<first two hex digits of id>/<id>.json   BlobMeta
//! ```
//!
//! Content is written to `<id>.part` and renamed into place once the stream
//! is drained, so a reader never sees a half-written blob.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::storage::{BlobMeta, BlobStore, ByteStream, NewBlob};

/// Blob store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new store, creating the root directory if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn shard(&self, id: Uuid) -> PathBuf {
        let hex = id.simple().to_string();
        self.root.join(&hex[..2])
    }

    fn content_path(&self, id: Uuid) -> PathBuf {
        self.shard(id).join(format!("{id}.blob"))
    }

    fn partial_path(&self, id: Uuid) -> PathBuf {
        self.shard(id).join(format!("{id}.part"))
    }

    fn meta_path(&self, id: Uuid) -> PathBuf {
        self.shard(id).join(format!("{id}.json"))
    }

    async fn read_meta(&self, id: Uuid) -> AppResult<BlobMeta> {
        let raw = fs::read(self.meta_path(id)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {id}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob metadata: {id}"),
                    e,
                )
            }
        })?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Copy the stream into the partial file, returning the byte count.
    async fn write_partial(&self, path: &Path, mut data: ByteStream) -> AppResult<u64> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob file: {}", path.display()),
                e,
            )
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = data.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Upload stream error", e))?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write blob chunk", e)
            })?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush blob", e))?;
        Ok(total_bytes)
    }
}

/// Remove a file, treating "already gone" as success.
async fn remove_if_present(path: &Path) -> AppResult<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to delete {}", path.display()),
            e,
        )),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, blob: NewBlob, data: ByteStream) -> AppResult<BlobMeta> {
        let id = Uuid::new_v4();
        fs::create_dir_all(self.shard(id)).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create blob directory", e)
        })?;

        let partial = self.partial_path(id);
        let byte_length = match self.write_partial(&partial, data).await {
            Ok(n) => n,
            Err(e) => {
                if let Err(cleanup) = remove_if_present(&partial).await {
                    warn!(blob_id = %id, error = %cleanup, "Failed to remove partial blob");
                }
                return Err(e);
            }
        };

        let meta = BlobMeta {
            id,
            filename: blob.filename,
            content_type: blob.content_type,
            byte_length,
            owner_id: blob.owner_id,
            created_at: Utc::now(),
        };
        fs::write(self.meta_path(id), serde_json::to_vec(&meta)?)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write blob metadata", e)
            })?;
        fs::rename(&partial, self.content_path(id))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to commit blob", e))?;

        debug!(blob_id = %id, bytes = byte_length, "Stored blob");
        Ok(meta)
    }

    async fn get(&self, id: Uuid) -> AppResult<(BlobMeta, ByteStream)> {
        let meta = self.read_meta(id).await?;
        let file = fs::File::open(self.content_path(id)).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob content not found: {id}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open blob: {id}"),
                    e,
                )
            }
        })?;

        let stream: ByteStream = Box::pin(ReaderStream::new(file));
        Ok((meta, stream))
    }

    async fn metadata(&self, id: Uuid) -> AppResult<BlobMeta> {
        self.read_meta(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let content = remove_if_present(&self.content_path(id)).await?;
        let meta = remove_if_present(&self.meta_path(id)).await?;
        let existed = content || meta;
        debug!(blob_id = %id, existed, "Deleted blob");
        Ok(existed)
    }
}
