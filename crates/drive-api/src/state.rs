//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use drive_core::config::AppConfig;
use drive_core::traits::BlobStore;
use drive_database::DatabasePool;
use drive_database::repositories::{FileRepository, FolderRepository};
use drive_service::{
    DownloadLinks, DownloadService, FileService, FolderService, ListingService, UploadService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, `None` on the memory backend.
    pub database: Option<DatabasePool>,
    pub blob_store: Arc<dyn BlobStore>,

    // ── Services ─────────────────────────────────────────────
    pub folder_service: Arc<FolderService>,
    pub file_service: Arc<FileService>,
    pub upload_service: Arc<UploadService>,
    pub download_service: Arc<DownloadService>,
    pub listing_service: Arc<ListingService>,
}

impl AppState {
    /// Wire every service over the given backends.
    pub fn new(
        config: AppConfig,
        database: Option<DatabasePool>,
        folder_repo: Arc<dyn FolderRepository>,
        file_repo: Arc<dyn FileRepository>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        let links = DownloadLinks::new(&config.server.public_base_url);

        let folder_service = Arc::new(FolderService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&file_repo),
            Arc::clone(&blob_store),
        ));
        let file_service = Arc::new(FileService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&file_repo),
            Arc::clone(&blob_store),
            links.clone(),
        ));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&file_repo),
            Arc::clone(&blob_store),
            config.upload.clone(),
            links,
        ));
        let download_service = Arc::new(DownloadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&blob_store),
        ));
        let listing_service = Arc::new(ListingService::new(folder_repo, file_repo));

        Self {
            config: Arc::new(config),
            database,
            blob_store,
            folder_service,
            file_service,
            upload_service,
            download_service,
            listing_service,
        }
    }
}
