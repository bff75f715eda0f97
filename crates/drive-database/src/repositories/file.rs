//! PostgreSQL file repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::types::{PageRequest, PageResponse, SortField};
use drive_entity::{CreateFile, File, LifecycleState, Transition, UpdateFile};

use super::FileRepository;
use super::filter::{NodeFilter, push_order_and_page, push_where};

/// File rows stored in the `files` table.
#[derive(Debug, Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files \
             (id, name, parent_id, owner_id, blob_ref, mime_type, byte_size, public_url, lifecycle_state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(&data.owner_id)
        .bind(data.blob_ref)
        .bind(&data.mime_type)
        .bind(data.byte_size)
        .bind(&data.public_url)
        .bind(LifecycleState::Active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("files_blob_ref_key") =>
            {
                AppError::validation(format!(
                    "Blob {} is already referenced by another file",
                    data.blob_ref
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file", e),
        })
    }

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_unscoped(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_blob_unscoped(&self, blob_id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE blob_ref = $1")
            .bind(blob_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file by blob", e)
            })
    }

    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<File>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM files");
        push_where(&mut query, filter);
        push_order_and_page(&mut query, sort, page);

        let files = query
            .build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))?;

        let Some(page) = page else {
            return Ok(PageResponse::unpaged(files));
        };

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM files");
        push_where(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;

        Ok(PageResponse::new(files, page.page, page.page_size, total as u64))
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        data: &UpdateFile,
    ) -> AppResult<Option<File>> {
        if data.name.is_none() && data.parent_id.is_none() {
            return self.find_by_id(id, owner_id).await;
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");
        if let Some(name) = &data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(parent_id) = data.parent_id {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent_id);
        }
        separated.push("updated_at = now()");

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" AND owner_id = ");
        query.push_bind(owner_id.to_string());
        query.push(" RETURNING *");

        query
            .build_query_as::<File>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))
    }

    async fn ensure_state(
        &self,
        id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let trashed_at = target.is_trashed().then_some(at);
        let result = sqlx::query(
            "UPDATE files SET lifecycle_state = $1, trashed_at = $2, updated_at = $3 \
             WHERE id = $4 AND owner_id = $5 AND lifecycle_state <> $1",
        )
        .bind(target)
        .bind(trashed_at)
        .bind(at)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file state", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn ensure_state_in_folder(
        &self,
        parent_id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let trashed_at = target.is_trashed().then_some(at);
        let result = sqlx::query(
            "UPDATE files SET lifecycle_state = $1, trashed_at = $2, updated_at = $3 \
             WHERE parent_id = $4 AND owner_id = $5 AND lifecycle_state <> $1",
        )
        .bind(target)
        .bind(trashed_at)
        .bind(at)
        .bind(parent_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update files in folder", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM files WHERE id = $1 AND owner_id = $2 AND lifecycle_state = $3",
        )
        .bind(id)
        .bind(owner_id)
        .bind(Transition::Purge.source_state())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
