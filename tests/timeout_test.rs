//! Request deadline behaviour against a blob store that stalls.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use uuid::Uuid;

use drive_api::AppState;
use drive_core::result::AppResult;
use drive_core::traits::{BlobMeta, BlobStore, ByteStream, NewBlob};
use drive_database::{MemoryFileRepository, MemoryFolderRepository};
use drive_storage::MemoryBlobStore;

use common::{OWNER, TestApp, memory_config, part};

const STALL: Duration = Duration::from_secs(5);

/// Memory store whose reads and deletes take longer than the deadline.
#[derive(Debug)]
struct StallingBlobStore {
    inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for StallingBlobStore {
    fn provider_type(&self) -> &str {
        "stalling"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn put(&self, blob: NewBlob, data: ByteStream) -> AppResult<BlobMeta> {
        self.inner.put(blob, data).await
    }

    async fn get(&self, id: Uuid) -> AppResult<(BlobMeta, ByteStream)> {
        tokio::time::sleep(STALL).await;
        self.inner.get(id).await
    }

    async fn metadata(&self, id: Uuid) -> AppResult<BlobMeta> {
        self.inner.metadata(id).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        tokio::time::sleep(STALL).await;
        self.inner.delete(id).await
    }
}

fn stalling_app() -> TestApp {
    let mut config = memory_config();
    config.server.request_timeout_seconds = 1;
    TestApp::from_state(AppState::new(
        config,
        None,
        Arc::new(MemoryFolderRepository::new()),
        Arc::new(MemoryFileRepository::new()),
        Arc::new(StallingBlobStore {
            inner: MemoryBlobStore::new(),
        }),
    ))
}

#[tokio::test(start_paused = true)]
async fn test_slow_download_hits_the_deadline() {
    let app = stalling_app();
    let (status, body) = app
        .upload(OWNER, None, part("slow.txt", "text/plain", b"slow"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let file_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .get(OWNER, &format!("/api/files/{file_id}/download"))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INTERNAL");
}

#[tokio::test(start_paused = true)]
async fn test_folder_hard_delete_outlives_the_deadline() {
    let app = stalling_app();
    let a = app.create_folder(OWNER, "A", None).await;
    let b = app.create_folder(OWNER, "B", Some(&a)).await;
    for name in ["one.txt", "two.txt"] {
        let (status, _) = app
            .upload(OWNER, Some(&b), part(name, "text/plain", b"x"))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.delete(OWNER, &format!("/api/folders/{a}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filesChanged"], 2);

    let (status, body) = app.delete(OWNER, &format!("/api/folders/{a}/hard")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["transition"], "purge");
    assert_eq!(body["data"]["foldersChanged"], 2);
    assert_eq!(body["data"]["filesChanged"], 2);
    assert_eq!(body["data"]["blobsPurged"], 2);

    let (status, _) = app.get(OWNER, &format!("/api/folders/{b}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(OWNER, &format!("/api/folders/{a}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
