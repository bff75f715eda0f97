//! Combined folder and file listings for the drive browser.

use axum::Json;
use axum::extract::{Query, State};

use drive_core::types::{SortField, SortKey};
use drive_entity::FolderContents;
use drive_service::listing::{DRIVE_PAGE_SIZE, DriveContents, DriveQuery};

use crate::dto::request::DriveFilter;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Owner, PaginationParams};
use crate::state::AppState;

/// GET /api/drive/contents
pub async fn drive_contents(
    State(state): State<AppState>,
    owner: Owner,
    Query(filter): Query<DriveFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<DriveContents>>, ApiError> {
    let query = DriveQuery {
        parent_id: filter.parent_id,
        search: filter.search.filter(|s| !s.trim().is_empty()),
        sort: params.sort(SortField::desc(SortKey::CreatedAt))?,
        page: params.page_request(DRIVE_PAGE_SIZE),
    };
    let contents = state.listing_service.drive_contents(&owner, query).await?;
    Ok(Json(ApiResponse::ok(contents)))
}

/// GET /api/drive/trash
pub async fn drive_trash(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<ApiResponse<FolderContents>>, ApiError> {
    let trash = state.listing_service.trash(&owner).await?;
    Ok(Json(ApiResponse::ok(trash)))
}
