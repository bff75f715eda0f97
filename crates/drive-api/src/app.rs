//! Application builder: wires backends and services into an Axum app.

use std::sync::Arc;

use axum::Router;

use drive_core::config::AppConfig;
use drive_core::config::database::DatabaseBackend;
use drive_core::result::AppResult;
use drive_database::migration::run_migrations;
use drive_database::repositories::{FileRepository, FolderRepository};
use drive_database::{
    DatabasePool, MemoryFileRepository, MemoryFolderRepository, PgFileRepository,
    PgFolderRepository,
};
use drive_storage::open_blob_store;

use crate::router::build_router;
use crate::state::AppState;

/// Open the configured database and blob store and build the shared state.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let blob_store = open_blob_store(&config.storage).await?;

    let (database, folder_repo, file_repo): (
        Option<DatabasePool>,
        Arc<dyn FolderRepository>,
        Arc<dyn FileRepository>,
    ) = match config.database.backend {
        DatabaseBackend::Postgres => {
            let database = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                run_migrations(database.pool()).await?;
            }
            let pool = database.pool().clone();
            (
                Some(database),
                Arc::new(PgFolderRepository::new(pool.clone())),
                Arc::new(PgFileRepository::new(pool)),
            )
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using the in-memory repositories; data is lost on restart");
            (
                None,
                Arc::new(MemoryFolderRepository::new()),
                Arc::new(MemoryFileRepository::new()),
            )
        }
    };

    Ok(AppState::new(
        config,
        database,
        folder_repo,
        file_repo,
        blob_store,
    ))
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
