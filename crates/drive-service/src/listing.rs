//! Combined listings of folders and files.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use drive_core::result::AppResult;
use drive_core::types::{PageRequest, PageResponse, SortField, SortKey};
use drive_database::repositories::{FileRepository, FolderRepository, NodeFilter, ParentFilter};
use drive_entity::{File, Folder, FolderContents, LifecycleState};

use crate::context::RequestContext;
use crate::folder::service::require_folder;

/// Default page size of the drive browser.
pub const DRIVE_PAGE_SIZE: u64 = 20;

/// Query for one level of the drive.
#[derive(Debug, Clone)]
pub struct DriveQuery {
    /// `None` lists the root.
    pub parent_id: Option<Uuid>,
    /// Case-insensitive name filter.
    pub search: Option<String>,
    pub sort: SortField,
    pub page: PageRequest,
}

impl Default for DriveQuery {
    fn default() -> Self {
        Self {
            parent_id: None,
            search: None,
            sort: SortField::desc(SortKey::CreatedAt),
            page: PageRequest::new(1, DRIVE_PAGE_SIZE),
        }
    }
}

/// Active folders and files of one level, paged independently.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveContents {
    pub parent_id: Option<Uuid>,
    pub folders: PageResponse<Folder>,
    pub files: PageResponse<File>,
    pub total_folders: u64,
    pub total_files: u64,
}

impl DriveContents {
    pub fn total_items(&self) -> u64 {
        self.total_folders + self.total_files
    }
}

/// Read-only views across both node kinds.
#[derive(Clone)]
pub struct ListingService {
    folder_repo: Arc<dyn FolderRepository>,
    file_repo: Arc<dyn FileRepository>,
}

impl std::fmt::Debug for ListingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingService").finish_non_exhaustive()
    }
}

impl ListingService {
    pub fn new(folder_repo: Arc<dyn FolderRepository>, file_repo: Arc<dyn FileRepository>) -> Self {
        Self {
            folder_repo,
            file_repo,
        }
    }

    /// Active children of a folder (or the root), filtered, sorted and paged.
    pub async fn drive_contents(
        &self,
        ctx: &RequestContext,
        query: DriveQuery,
    ) -> AppResult<DriveContents> {
        if let Some(parent_id) = query.parent_id {
            require_folder(self.folder_repo.as_ref(), &ctx.owner_id, parent_id, "Folder").await?;
        }

        let mut filter = NodeFilter::for_owner(&ctx.owner_id)
            .in_parent(ParentFilter::from_parent(query.parent_id))
            .with_state(LifecycleState::Active);
        if let Some(search) = query.search {
            filter = filter.name_contains(search);
        }

        let folders = self
            .folder_repo
            .list(&filter, query.sort, Some(query.page))
            .await?;
        let files = self
            .file_repo
            .list(&filter, query.sort, Some(query.page))
            .await?;

        Ok(DriveContents {
            parent_id: query.parent_id,
            total_folders: folders.total_items,
            total_files: files.total_items,
            folders,
            files,
        })
    }

    /// Everything in the owner's trash.
    pub async fn trash(&self, ctx: &RequestContext) -> AppResult<FolderContents> {
        let filter = NodeFilter::for_owner(&ctx.owner_id).with_state(LifecycleState::Trashed);
        let sort = SortField::desc(SortKey::UpdatedAt);
        let folders = self.folder_repo.list(&filter, sort, None).await?.items;
        let files = self.file_repo.list(&filter, sort, None).await?.items;
        Ok(FolderContents { folders, files })
    }
}

#[cfg(test)]
mod tests {
    use drive_core::error::ErrorKind;

    use super::*;
    use crate::folder::CreateFolderRequest;
    use crate::test_support::{Harness, ctx, upload};

    #[tokio::test]
    async fn test_drive_contents_filters_and_pages() {
        let h = Harness::new();
        let owner = ctx("u1");
        let docs = h
            .folders
            .create(
                &owner,
                CreateFolderRequest {
                    name: "Docs".into(),
                    parent_id: None,
                },
            )
            .await
            .unwrap();
        for name in ["plan.txt", "Plan-B.txt", "budget.xlsx"] {
            h.uploads
                .upload(&owner, Some(docs.id), upload(name, "", "x"))
                .await
                .unwrap();
        }
        h.uploads
            .upload(&owner, None, upload("root.txt", "text/plain", "r"))
            .await
            .unwrap();

        let level = h
            .listing
            .drive_contents(
                &owner,
                DriveQuery {
                    parent_id: Some(docs.id),
                    search: Some("plan".into()),
                    sort: SortField::asc(SortKey::Name),
                    page: PageRequest::new(1, 1),
                },
            )
            .await
            .unwrap();
        assert_eq!(level.files.total_items, 2);
        assert_eq!(level.files.items.len(), 1);
        assert!(level.files.has_next);
        assert_eq!(level.folders.total_items, 0);

        let root = h
            .listing
            .drive_contents(&owner, DriveQuery::default())
            .await
            .unwrap();
        assert_eq!(root.folders.total_items, 1);
        assert_eq!(root.files.total_items, 1);
        assert_eq!(root.total_items(), 2);
    }

    #[tokio::test]
    async fn test_drive_contents_of_foreign_folder_is_not_found() {
        let h = Harness::new();
        let folder = h
            .folders
            .create(
                &ctx("u1"),
                CreateFolderRequest {
                    name: "Mine".into(),
                    parent_id: None,
                },
            )
            .await
            .unwrap();

        let err = h
            .listing
            .drive_contents(
                &ctx("u2"),
                DriveQuery {
                    parent_id: Some(folder.id),
                    ..DriveQuery::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_trash_lists_both_kinds() {
        let h = Harness::new();
        let owner = ctx("u1");
        let folder = h
            .folders
            .create(
                &owner,
                CreateFolderRequest {
                    name: "Old".into(),
                    parent_id: None,
                },
            )
            .await
            .unwrap();
        h.uploads
            .upload(&owner, Some(folder.id), upload("a.txt", "text/plain", "a"))
            .await
            .unwrap();
        h.folders.delete(&owner, folder.id).await.unwrap();

        let trash = h.listing.trash(&owner).await.unwrap();
        assert_eq!(trash.folders.len(), 1);
        assert_eq!(trash.files.len(), 1);
        assert!(h.listing.trash(&ctx("u2")).await.unwrap().is_empty());
    }
}
