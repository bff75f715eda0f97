//! In-memory blob store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use dashmap::DashMap;
use futures::StreamExt;
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::storage::{BlobMeta, BlobStore, ByteStream, NewBlob, stream_from_bytes};

/// Blob store keeping content in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<Uuid, (BlobMeta, Bytes)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.blobs.contains_key(&id)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, blob: NewBlob, mut data: ByteStream) -> AppResult<BlobMeta> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = data.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Upload stream error", e))?;
            buf.extend_from_slice(&chunk);
        }
        let content = buf.freeze();

        let meta = BlobMeta {
            id: Uuid::new_v4(),
            filename: blob.filename,
            content_type: blob.content_type,
            byte_length: content.len() as u64,
            owner_id: blob.owner_id,
            created_at: Utc::now(),
        };
        self.blobs.insert(meta.id, (meta.clone(), content));
        Ok(meta)
    }

    async fn get(&self, id: Uuid) -> AppResult<(BlobMeta, ByteStream)> {
        let entry = self
            .blobs
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {id}")))?;
        let (meta, content) = entry.value().clone();
        Ok((meta, stream_from_bytes(content)))
    }

    async fn metadata(&self, id: Uuid) -> AppResult<BlobMeta> {
        self.blobs
            .get(&id)
            .map(|entry| entry.value().0.clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {id}")))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.blobs.remove(&id).is_some())
    }
}
