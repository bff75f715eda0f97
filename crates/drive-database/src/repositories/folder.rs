//! PostgreSQL folder repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::types::{PageRequest, PageResponse, SortField};
use drive_entity::{CreateFolder, Folder, LifecycleState, Transition, UpdateFolder};

use super::FolderRepository;
use super::filter::{NodeFilter, push_order_and_page, push_where};

/// Folder rows stored in the `folders` table.
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, name, parent_id, owner_id, lifecycle_state) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(&data.owner_id)
        .bind(LifecycleState::Active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create folder", e))
    }

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<Folder>> {
        let sort = sort.for_folders();

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM folders");
        push_where(&mut query, filter);
        push_order_and_page(&mut query, sort, page);

        let folders = query
            .build_query_as::<Folder>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))?;

        let Some(page) = page else {
            return Ok(PageResponse::unpaged(folders));
        };

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM folders");
        push_where(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count folders", e))?;

        Ok(PageResponse::new(
            folders,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn child_ids(&self, parent_id: Uuid, owner_id: &str) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM folders WHERE parent_id = $1 AND owner_id = $2 ORDER BY id",
        )
        .bind(parent_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list child folders", e))
    }

    async fn ancestor_ids(&self, id: Uuid, owner_id: &str) -> AppResult<Vec<Uuid>> {
        // UNION (not UNION ALL) drops revisited rows, so a cycle ends the recursion.
        sqlx::query_scalar::<_, Uuid>(
            "WITH RECURSIVE ancestors(id, parent_id) AS ( \
                SELECT id, parent_id FROM folders WHERE id = $1 AND owner_id = $2 \
                UNION \
                SELECT f.id, f.parent_id FROM folders f \
                INNER JOIN ancestors a ON f.id = a.parent_id \
                WHERE f.owner_id = $2 \
             ) SELECT id FROM ancestors",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ancestors", e))
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        data: &UpdateFolder,
    ) -> AppResult<Option<Folder>> {
        if data.is_empty() {
            return self.find_by_id(id, owner_id).await;
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE folders SET ");
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
            .build_query_as::<Folder>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update folder", e))
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
            "UPDATE folders SET lifecycle_state = $1, trashed_at = $2, updated_at = $3 \
             WHERE id = $4 AND owner_id = $5 AND lifecycle_state <> $1",
        )
        .bind(target)
        .bind(trashed_at)
        .bind(at)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update folder state", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM folders WHERE id = $1 AND owner_id = $2 AND lifecycle_state = $3",
        )
        .bind(id)
        .bind(owner_id)
        .bind(Transition::Purge.source_state())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete folder", e))?;
        Ok(result.rows_affected() > 0)
    }
}
