//! Blob store trait for pluggable content backends.
//!
//! A blob is an opaque byte sequence with a small metadata record. Blobs are
//! never shared or deduplicated: every `put` produces a fresh id, and the
//! file record that references a blob owns it exclusively.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// A byte stream type used for reading and writing blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Metadata stored next to every blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMeta {
    pub id: Uuid,
    /// Name the content was uploaded under.
    pub filename: String,
    pub content_type: String,
    pub byte_length: u64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied attributes for a new blob.
#[derive(Debug, Clone)]
pub struct NewBlob {
    pub filename: String,
    pub content_type: String,
    pub owner_id: String,
}

/// Wrap an in-memory buffer as a single-chunk [`ByteStream`].
pub fn stream_from_bytes(data: Bytes) -> ByteStream {
    Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// Drain a [`ByteStream`] into one buffer.
pub async fn collect_stream(mut stream: ByteStream) -> Result<Bytes, std::io::Error> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Trait for blob storage backends.
///
/// Deleting a blob that is already absent succeeds with `Ok(false)` on
/// every implementation, so purges can be retried safely.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is reachable and writable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store a new blob from a byte stream and return its metadata.
    async fn put(&self, blob: NewBlob, data: ByteStream) -> AppResult<BlobMeta>;

    /// Store a new blob from an in-memory buffer.
    async fn put_bytes(&self, blob: NewBlob, data: Bytes) -> AppResult<BlobMeta> {
        self.put(blob, stream_from_bytes(data)).await
    }

    /// Open a blob for reading. `NotFound` if absent.
    async fn get(&self, id: Uuid) -> AppResult<(BlobMeta, ByteStream)>;

    /// Read only the metadata of a blob. `NotFound` if absent.
    async fn metadata(&self, id: Uuid) -> AppResult<BlobMeta>;

    /// Remove a blob. Returns `true` if something was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}
