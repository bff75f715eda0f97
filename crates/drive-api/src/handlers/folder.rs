//! Folder CRUD and lifecycle handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use drive_core::types::{PageResponse, SortField};
use drive_entity::{Folder, FolderContents};
use drive_service::CascadeReport;
use drive_service::folder::{CreateFolderRequest, UpdateFolderRequest};

use super::cascade_response;
use crate::dto::request::{CreateFolderBody, UpdateNodeBody, validate_body};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Owner, PaginationParams};
use crate::state::AppState;

const ROOT_PAGE_SIZE: u64 = 10;

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    owner: Owner,
    Json(body): Json<CreateFolderBody>,
) -> Result<(StatusCode, Json<ApiResponse<Folder>>), ApiError> {
    validate_body(&body)?;
    let folder = state
        .folder_service
        .create(
            &owner,
            CreateFolderRequest {
                name: body.name,
                parent_id: body.parent_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// GET /api/folders
pub async fn list_root_folders(
    State(state): State<AppState>,
    owner: Owner,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Folder>>>, ApiError> {
    let sort = params.sort(SortField::default())?;
    let page = state
        .folder_service
        .list_roots(&owner, params.page_request(ROOT_PAGE_SIZE), sort)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/folders/trash
pub async fn list_trashed_folders(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<ApiResponse<Vec<Folder>>>, ApiError> {
    let folders = state.folder_service.list_trashed(&owner).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    let folder = state.folder_service.get(&owner, id).await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// GET /api/folders/{id}/contents
pub async fn folder_contents(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FolderContents>>, ApiError> {
    let contents = state.folder_service.contents(&owner, id).await?;
    Ok(Json(ApiResponse::ok(contents)))
}

/// PUT /api/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNodeBody>,
) -> Result<Json<ApiResponse<Folder>>, ApiError> {
    validate_body(&body)?;
    let folder = state
        .folder_service
        .update(
            &owner,
            id,
            UpdateFolderRequest {
                name: body.name,
                parent_id: body.parent_id,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CascadeReport>>, ApiError> {
    let report = state.folder_service.delete(&owner, id).await?;
    Ok(cascade_response(report))
}

/// POST /api/folders/{id}/restore
pub async fn restore_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CascadeReport>>, ApiError> {
    let report = state.folder_service.restore(&owner, id).await?;
    Ok(cascade_response(report))
}

/// DELETE /api/folders/{id}/hard
pub async fn hard_delete_folder(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CascadeReport>>, ApiError> {
    let report = state.folder_service.hard_delete(&owner, id).await?;
    Ok(cascade_response(report))
}
