//! File CRUD, upload, download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::types::{PageResponse, SortField};
use drive_entity::{File, FileMetadata};
use drive_service::file::{
    BlobReceipt, CreateFileRequest, Download, UpdateFileRequest, UploadManifest, UploadReceipt,
    UploadedFile,
};

use crate::dto::request::{CreateFileBody, SearchQuery, UpdateNodeBody, validate_body};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Owner, PaginationParams};
use crate::state::AppState;

const FILE_PAGE_SIZE: u64 = 20;

/// GET /api/files
pub async fn list_files(
    State(state): State<AppState>,
    owner: Owner,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<File>>>, ApiError> {
    let sort = params.sort(SortField::default())?;
    let page = state
        .file_service
        .find_all(&owner, params.page_request(FILE_PAGE_SIZE), sort)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/files/root
pub async fn list_root_files(
    State(state): State<AppState>,
    owner: Owner,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<File>>>, ApiError> {
    let sort = params.sort(SortField::default())?;
    let page = state
        .file_service
        .find_root(&owner, params.optional_page(FILE_PAGE_SIZE), sort)
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/files/trash
pub async fn list_trashed_files(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<ApiResponse<Vec<File>>>, ApiError> {
    let files = state.file_service.list_trashed(&owner).await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// GET /api/files/search?name=...
pub async fn search_files(
    State(state): State<AppState>,
    owner: Owner,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<File>>>, ApiError> {
    let files = state
        .file_service
        .search_by_name(&owner, &query.name)
        .await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// GET /api/files/folder/{folder_id}
pub async fn list_folder_files(
    State(state): State<AppState>,
    owner: Owner,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<File>>>, ApiError> {
    let files = state.file_service.find_in_folder(&owner, folder_id).await?;
    Ok(Json(ApiResponse::ok(files)))
}

/// POST /api/files
pub async fn create_file(
    State(state): State<AppState>,
    owner: Owner,
    Json(body): Json<CreateFileBody>,
) -> Result<(StatusCode, Json<ApiResponse<File>>), ApiError> {
    validate_body(&body)?;
    let file = state
        .file_service
        .create(
            &owner,
            CreateFileRequest {
                name: body.name,
                parent_id: body.parent_id,
                blob_ref: body.blob_ref,
                mime_type: body.mime_type,
                byte_size: body.byte_size,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// POST /api/files/upload (multipart: `file`, optional `parentId`)
pub async fn upload_file(
    State(state): State<AppState>,
    owner: Owner,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadReceipt>>), ApiError> {
    let form = read_upload_form(multipart, "file").await?;
    let mut files = form.files.into_iter();
    let file = files
        .next()
        .ok_or_else(|| AppError::validation("No file was uploaded"))?;
    if files.next().is_some() {
        return Err(AppError::validation("Use /api/files/upload-many for several files").into());
    }

    let receipt = state
        .upload_service
        .upload(&owner, form.parent_id, file)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(receipt))))
}

/// POST /api/files/blob (multipart: one `file`)
///
/// Stores the content only. Register it with `POST /api/files`.
pub async fn upload_blob(
    State(state): State<AppState>,
    owner: Owner,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<BlobReceipt>>), ApiError> {
    let form = read_upload_form(multipart, "file").await?;
    let mut files = form.files.into_iter();
    let file = files
        .next()
        .ok_or_else(|| AppError::validation("No file was uploaded"))?;
    if files.next().is_some() {
        return Err(AppError::validation("Only one file can be stored per request").into());
    }

    let receipt = state.upload_service.upload_blob(&owner, file).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(receipt))))
}

/// POST /api/files/upload-many (multipart: repeated `files`, optional `parentId`)
pub async fn upload_many_files(
    State(state): State<AppState>,
    owner: Owner,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadManifest>>, ApiError> {
    let form = read_upload_form(multipart, "files").await?;
    let manifest = state
        .upload_service
        .upload_many(&owner, form.parent_id, form.files)
        .await?;

    if manifest.rejected == 0 {
        return Ok(Json(ApiResponse::ok(manifest)));
    }
    let message = format!(
        "{} file(s) stored, {} rejected",
        manifest.stored, manifest.rejected
    );
    Ok(Json(ApiResponse::with_message(manifest, message)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    let file = state.file_service.find_by_id(&owner, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/files/{id}/metadata
pub async fn get_file_metadata(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileMetadata>>, ApiError> {
    let meta = state.file_service.get_metadata(&owner, id).await?;
    Ok(Json(ApiResponse::ok(meta)))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let download = state.download_service.download(&owner, id).await?;
    stream_download(download)
}

/// GET /api/files/blob/{blob_id}
pub async fn download_blob(
    State(state): State<AppState>,
    owner: Owner,
    Path(blob_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let download = state
        .download_service
        .download_by_blob(&owner, blob_id)
        .await?;
    stream_download(download)
}

/// PUT /api/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNodeBody>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    validate_body(&body)?;
    let file = state
        .file_service
        .update(
            &owner,
            id,
            UpdateFileRequest {
                name: body.name,
                parent_id: body.parent_id,
            },
        )
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    let file = state.file_service.delete(&owner, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// POST /api/files/{id}/restore
pub async fn restore_file(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    let file = state.file_service.restore(&owner, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/files/{id}/hard
pub async fn hard_delete_file(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Option<File>>>, ApiError> {
    state.file_service.hard_delete(&owner, id).await?;
    Ok(Json(ApiResponse::with_message(
        None,
        format!("File {id} permanently deleted"),
    )))
}

/// Parsed multipart upload form.
struct UploadForm {
    parent_id: Option<Uuid>,
    files: Vec<UploadedFile>,
}

/// Collect every part named `file_field` plus the optional `parentId`.
async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm {
        parent_id: None,
        files: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "parentId" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            let text = text.trim();
            if !text.is_empty() {
                form.parent_id = Some(
                    Uuid::parse_str(text).map_err(|_| AppError::validation("Invalid parentId"))?,
                );
            }
        } else if name == file_field {
            let original_name = field.file_name().unwrap_or("").to_string();
            let mime_type = field.content_type().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
            form.files.push(UploadedFile {
                original_name,
                mime_type,
                data,
            });
        }
    }

    Ok(form)
}

/// Stream blob content back with download headers.
fn stream_download(download: Download) -> Result<Response, ApiError> {
    let filename: String = download
        .file
        .name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_LENGTH, download.byte_length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}
