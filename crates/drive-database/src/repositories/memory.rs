//! In-memory repositories backed by `dashmap`.
//!
//! Used by the `memory` database backend and by tests. Filtering and
//! conditional writes follow the PostgreSQL implementations. Names sort
//! case-insensitively, with byte order breaking ties; PostgreSQL orders by
//! the database collation, which agrees for ASCII names under the usual
//! `en_US` style collations but may differ for other scripts.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use drive_core::error::AppError;
use drive_core::result::AppResult;
use drive_core::types::{PageRequest, PageResponse, SortDirection, SortField, SortKey};
use drive_entity::{
    CreateFile, CreateFolder, File, Folder, LifecycleState, Transition, UpdateFile,
    UpdateFolder,
};

use super::filter::NodeFilter;
use super::{FileRepository, FolderRepository};

/// Folder rows held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFolderRepository {
    folders: Arc<DashMap<Uuid, Folder>>,
}

/// File rows held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileRepository {
    files: Arc<DashMap<Uuid, File>>,
}

impl MemoryFolderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, across all owners and states.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

impl MemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, across all owners and states.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

struct SortProbe<'a> {
    id: Uuid,
    name: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    byte_size: i64,
}

fn compare(a: &SortProbe<'_>, b: &SortProbe<'_>, sort: SortField) -> Ordering {
    let primary = match sort.key {
        SortKey::Name => compare_names(a.name, b.name),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortKey::ByteSize => a.byte_size.cmp(&b.byte_size),
    };
    let primary = match sort.direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

fn paginate<T: serde::Serialize>(items: Vec<T>, page: Option<PageRequest>) -> PageResponse<T> {
    match page {
        Some(page) => {
            let total = items.len() as u64;
            PageResponse::new(page.slice(items), page.page, page.page_size, total)
        }
        None => PageResponse::unpaged(items),
    }
}

fn folder_probe(folder: &Folder) -> SortProbe<'_> {
    SortProbe {
        id: folder.id,
        name: &folder.name,
        created_at: folder.created_at,
        updated_at: folder.updated_at,
        byte_size: 0,
    }
}

fn file_probe(file: &File) -> SortProbe<'_> {
    SortProbe {
        id: file.id,
        name: &file.name,
        created_at: file.created_at,
        updated_at: file.updated_at,
        byte_size: file.byte_size,
    }
}

#[async_trait]
impl FolderRepository for MemoryFolderRepository {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::now_v7(),
            name: data.name.clone(),
            parent_id: data.parent_id,
            owner_id: data.owner_id.clone(),
            lifecycle_state: LifecycleState::Active,
            trashed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.folders.insert(folder.id, folder.clone());
        debug!(folder_id = %folder.id, "Inserted folder row");
        Ok(folder)
    }

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<Folder>> {
        Ok(self
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.clone()))
    }

    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<Folder>> {
        let sort = sort.for_folders();
        let mut matches: Vec<Folder> = self
            .folders
            .iter()
            .filter(|entry| filter.matches_folder(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| compare(&folder_probe(a), &folder_probe(b), sort));
        Ok(paginate(matches, page))
    }

    async fn child_ids(&self, parent_id: Uuid, owner_id: &str) -> AppResult<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self
            .folders
            .iter()
            .filter(|entry| entry.parent_id == Some(parent_id) && entry.owner_id == owner_id)
            .map(|entry| entry.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn ancestor_ids(&self, id: Uuid, owner_id: &str) -> AppResult<Vec<Uuid>> {
        let mut seen = HashSet::new();
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !seen.insert(current) {
                break;
            }
            let Some(folder) = self.folders.get(&current).filter(|f| f.owner_id == owner_id)
            else {
                break;
            };
            path.push(current);
            cursor = folder.parent_id;
        }
        Ok(path)
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        data: &UpdateFolder,
    ) -> AppResult<Option<Folder>> {
        let Some(mut folder) = self.folders.get_mut(&id).filter(|f| f.owner_id == owner_id)
        else {
            return Ok(None);
        };
        if data.is_empty() {
            return Ok(Some(folder.clone()));
        }
        if let Some(name) = &data.name {
            folder.name = name.clone();
        }
        if let Some(parent_id) = data.parent_id {
            folder.parent_id = parent_id;
        }
        folder.updated_at = Utc::now();
        Ok(Some(folder.clone()))
    }

    async fn ensure_state(
        &self,
        id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(mut folder) = self.folders.get_mut(&id).filter(|f| f.owner_id == owner_id)
        else {
            return Ok(false);
        };
        if folder.lifecycle_state == target {
            return Ok(false);
        }
        folder.lifecycle_state = target;
        folder.trashed_at = target.is_trashed().then_some(at);
        folder.updated_at = at;
        Ok(true)
    }

    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool> {
        Ok(self
            .folders
            .remove_if(&id, |_, f| {
                f.owner_id == owner_id && f.lifecycle_state == Transition::Purge.source_state()
            })
            .is_some())
    }
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        if self.files.iter().any(|entry| entry.blob_ref == data.blob_ref) {
            return Err(AppError::validation(format!(
                "Blob {} is already referenced by another file",
                data.blob_ref
            )));
        }
        let now = Utc::now();
        let file = File {
            id: Uuid::now_v7(),
            name: data.name.clone(),
            parent_id: data.parent_id,
            owner_id: data.owner_id.clone(),
            blob_ref: data.blob_ref,
            mime_type: data.mime_type.clone(),
            byte_size: data.byte_size,
            public_url: data.public_url.clone(),
            lifecycle_state: LifecycleState::Active,
            trashed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.files.insert(file.id, file.clone());
        debug!(file_id = %file.id, blob_id = %file.blob_ref, "Inserted file row");
        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid, owner_id: &str) -> AppResult<Option<File>> {
        Ok(self
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|f| f.clone()))
    }

    async fn find_unscoped(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.files.get(&id).map(|f| f.clone()))
    }

    async fn find_by_blob_unscoped(&self, blob_id: Uuid) -> AppResult<Option<File>> {
        Ok(self
            .files
            .iter()
            .find(|entry| entry.blob_ref == blob_id)
            .map(|entry| entry.value().clone()))
    }

    async fn list(
        &self,
        filter: &NodeFilter,
        sort: SortField,
        page: Option<PageRequest>,
    ) -> AppResult<PageResponse<File>> {
        let mut matches: Vec<File> = self
            .files
            .iter()
            .filter(|entry| filter.matches_file(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| compare(&file_probe(a), &file_probe(b), sort));
        Ok(paginate(matches, page))
    }

    async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        data: &UpdateFile,
    ) -> AppResult<Option<File>> {
        let Some(mut file) = self.files.get_mut(&id).filter(|f| f.owner_id == owner_id) else {
            return Ok(None);
        };
        if data.name.is_none() && data.parent_id.is_none() {
            return Ok(Some(file.clone()));
        }
        if let Some(name) = &data.name {
            file.name = name.clone();
        }
        if let Some(parent_id) = data.parent_id {
            file.parent_id = parent_id;
        }
        file.updated_at = Utc::now();
        Ok(Some(file.clone()))
    }

    async fn ensure_state(
        &self,
        id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let Some(mut file) = self.files.get_mut(&id).filter(|f| f.owner_id == owner_id) else {
            return Ok(false);
        };
        if file.lifecycle_state == target {
            return Ok(false);
        }
        file.lifecycle_state = target;
        file.trashed_at = target.is_trashed().then_some(at);
        file.updated_at = at;
        Ok(true)
    }

    async fn ensure_state_in_folder(
        &self,
        parent_id: Uuid,
        owner_id: &str,
        target: LifecycleState,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut changed = 0;
        for mut entry in self.files.iter_mut() {
            let file = entry.value_mut();
            if file.parent_id == Some(parent_id)
                && file.owner_id == owner_id
                && file.lifecycle_state != target
            {
                file.lifecycle_state = target;
                file.trashed_at = target.is_trashed().then_some(at);
                file.updated_at = at;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_trashed(&self, id: Uuid, owner_id: &str) -> AppResult<bool> {
        Ok(self
            .files
            .remove_if(&id, |_, f| {
                f.owner_id == owner_id && f.lifecycle_state == Transition::Purge.source_state()
            })
            .is_some())
    }
}
