//! Route definitions for the Drive HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.upload.max_request_body_bytes();

    // Folder cascades always run to completion and report, so they sit
    // outside the request deadline.
    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(file_routes())
        .merge(drive_routes())
        .route("/health", get(handlers::health::health))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::timeout::request_timeout,
        ))
        .merge(folder_cascade_routes());

    let cors = build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Folder CRUD and lifecycle
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_root_folders).post(handlers::folder::create_folder),
        )
        .route("/folders/trash", get(handlers::folder::list_trashed_folders))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder).put(handlers::folder::update_folder),
        )
        .route(
            "/folders/{id}/contents",
            get(handlers::folder::folder_contents),
        )
}

/// Folder lifecycle cascades
fn folder_cascade_routes() -> Router<AppState> {
    Router::new()
        .route("/folders/{id}", delete(handlers::folder::delete_folder))
        .route(
            "/folders/{id}/restore",
            post(handlers::folder::restore_folder),
        )
        .route(
            "/folders/{id}/hard",
            delete(handlers::folder::hard_delete_folder),
        )
}

/// File CRUD, upload, download
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_files).post(handlers::file::create_file),
        )
        .route("/files/root", get(handlers::file::list_root_files))
        .route("/files/trash", get(handlers::file::list_trashed_files))
        .route("/files/search", get(handlers::file::search_files))
        .route("/files/upload", post(handlers::file::upload_file))
        .route(
            "/files/upload-many",
            post(handlers::file::upload_many_files),
        )
        .route(
            "/files/folder/{folder_id}",
            get(handlers::file::list_folder_files),
        )
        .route("/files/blob", post(handlers::file::upload_blob))
        .route("/files/blob/{blob_id}", get(handlers::file::download_blob))
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .put(handlers::file::update_file)
                .delete(handlers::file::delete_file),
        )
        .route(
            "/files/{id}/metadata",
            get(handlers::file::get_file_metadata),
        )
        .route("/files/{id}/download", get(handlers::file::download_file))
        .route("/files/{id}/restore", post(handlers::file::restore_file))
        .route(
            "/files/{id}/hard",
            delete(handlers::file::hard_delete_file),
        )
}

/// Drive browser views
fn drive_routes() -> Router<AppState> {
    Router::new()
        .route("/drive/contents", get(handlers::drive::drive_contents))
        .route("/drive/trash", get(handlers::drive::drive_trash))
}
