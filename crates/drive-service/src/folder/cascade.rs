//! Subtree walks for the folder lifecycle transitions.
//!
//! Every walk is iterative with an explicit stack, so tree depth is bounded
//! only by memory. Each folder id is visited at most once, which keeps the
//! walk finite even if the stored parent links form a cycle.
//!
//! Writes are independent per node. A failing node is recorded in the
//! [`CascadeReport`] and the walk carries on with its siblings.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use drive_core::error::{AppError, ErrorKind};
use drive_core::result::AppResult;
use drive_core::traits::storage::BlobStore;
use drive_core::types::{SortField, SortKey};
use drive_database::repositories::{
    FileRepository, FolderRepository, NodeFilter, ParentFilter,
};
use drive_entity::{File, LifecycleState, Transition};

/// Kind of node a cascade step acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
    Blob,
}

/// One step of a cascade that did not complete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeFailure {
    pub node: NodeKind,
    pub id: Uuid,
    pub error: ErrorKind,
    pub message: String,
}

/// Outcome of a folder delete, restore or hard delete.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub root_id: Uuid,
    pub transition: Transition,
    /// Folders whose state changed (or that were removed, for purge).
    pub folders_changed: u64,
    /// Files whose state changed (or that were removed, for purge).
    pub files_changed: u64,
    /// Blobs actually removed from the store.
    pub blobs_purged: u64,
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    pub fn new(root_id: Uuid, transition: Transition) -> Self {
        Self {
            root_id,
            transition,
            folders_changed: 0,
            files_changed: 0,
            blobs_purged: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every step succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, node: NodeKind, id: Uuid, error: &AppError) {
        warn!(
            root_id = %self.root_id,
            transition = %self.transition,
            node = ?node,
            node_id = %id,
            error = %error,
            "Cascade step failed"
        );
        self.failures.push(CascadeFailure {
            node,
            id,
            error: error.kind,
            message: error.message.clone(),
        });
    }
}

/// Outcome of a single file purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FilePurge {
    pub blob_removed: bool,
    pub row_removed: bool,
}

/// Remove a trashed file's blob, then its row.
///
/// A blob that is already gone counts as removed, so a purge interrupted
/// between the two steps completes on retry.
pub(crate) async fn purge_file(
    files: &dyn FileRepository,
    blobs: &dyn BlobStore,
    file: &File,
) -> AppResult<FilePurge> {
    let blob_removed = blobs.delete(file.blob_ref).await?;
    let row_removed = files.delete_trashed(file.id, &file.owner_id).await?;
    debug!(file_id = %file.id, blob_id = %file.blob_ref, blob_removed, row_removed, "Purged file");
    Ok(FilePurge {
        blob_removed,
        row_removed,
    })
}

/// Walks one owner's subtree on behalf of a single request.
pub(crate) struct Cascade<'a> {
    pub folders: &'a dyn FolderRepository,
    pub files: &'a dyn FileRepository,
    pub blobs: &'a dyn BlobStore,
    pub owner_id: &'a str,
    pub at: DateTime<Utc>,
}

/// Folders of a subtree in pre-order, each with the folder it was reached from.
struct Subtree {
    order: Vec<(Uuid, Option<Uuid>)>,
    /// Folders whose children could not be listed.
    truncated: HashSet<Uuid>,
}

impl Cascade<'_> {
    async fn collect(&self, root_id: Uuid, report: &mut CascadeReport) -> Subtree {
        let mut subtree = Subtree {
            order: Vec::new(),
            truncated: HashSet::new(),
        };
        let mut visited = HashSet::new();
        let mut stack = vec![(root_id, None)];

        while let Some((id, via)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            subtree.order.push((id, via));
            match self.folders.child_ids(id, self.owner_id).await {
                Ok(children) => {
                    stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
                }
                Err(e) => {
                    report.record(NodeKind::Folder, id, &e);
                    subtree.truncated.insert(id);
                }
            }
        }
        subtree
    }

    /// Children first, then the folder's own files, then the folder.
    pub async fn trash(&self, root_id: Uuid) -> CascadeReport {
        let mut report = CascadeReport::new(root_id, Transition::Trash);
        let subtree = self.collect(root_id, &mut report).await;

        for &(folder_id, _) in subtree.order.iter().rev() {
            match self
                .files
                .ensure_state_in_folder(folder_id, self.owner_id, LifecycleState::Trashed, self.at)
                .await
            {
                Ok(changed) => report.files_changed += changed,
                Err(e) => report.record(NodeKind::Folder, folder_id, &e),
            }
            match self
                .folders
                .ensure_state(folder_id, self.owner_id, LifecycleState::Trashed, self.at)
                .await
            {
                Ok(true) => report.folders_changed += 1,
                Ok(false) => {}
                Err(e) => report.record(NodeKind::Folder, folder_id, &e),
            }
        }
        report
    }

    /// The folder first, then its files, then its children.
    pub async fn restore(&self, root_id: Uuid) -> CascadeReport {
        let mut report = CascadeReport::new(root_id, Transition::Restore);
        let mut visited = HashSet::new();
        let mut stack = vec![root_id];

        while let Some(folder_id) = stack.pop() {
            if !visited.insert(folder_id) {
                continue;
            }
            match self
                .folders
                .ensure_state(folder_id, self.owner_id, LifecycleState::Active, self.at)
                .await
            {
                Ok(true) => report.folders_changed += 1,
                Ok(false) => {}
                Err(e) => report.record(NodeKind::Folder, folder_id, &e),
            }
            match self
                .files
                .ensure_state_in_folder(folder_id, self.owner_id, LifecycleState::Active, self.at)
                .await
            {
                Ok(changed) => report.files_changed += changed,
                Err(e) => report.record(NodeKind::Folder, folder_id, &e),
            }
            match self.folders.child_ids(folder_id, self.owner_id).await {
                Ok(children) => stack.extend(children.into_iter().rev()),
                Err(e) => report.record(NodeKind::Folder, folder_id, &e),
            }
        }
        report
    }

    /// Purge files, then the folder, deepest folders first.
    ///
    /// A folder is kept whenever anything beneath it survives, so no
    /// remaining row ever points at a removed parent.
    pub async fn purge(&self, root_id: Uuid) -> CascadeReport {
        let mut report = CascadeReport::new(root_id, Transition::Purge);
        let subtree = self.collect(root_id, &mut report).await;
        let mut retained = subtree.truncated;

        for &(folder_id, via) in subtree.order.iter().rev() {
            if !self.purge_files_in(folder_id, &mut report).await {
                retained.insert(folder_id);
            }

            let removed = if retained.contains(&folder_id) {
                report.record(
                    NodeKind::Folder,
                    folder_id,
                    &AppError::invalid_state("Folder kept because part of its contents remain"),
                );
                false
            } else {
                self.purge_folder(folder_id, &mut report).await
            };

            if !removed {
                if let Some(parent) = via {
                    retained.insert(parent);
                }
            }
        }
        report
    }

    /// Returns `false` if any file in the folder was left behind.
    async fn purge_files_in(&self, folder_id: Uuid, report: &mut CascadeReport) -> bool {
        let filter = NodeFilter::for_owner(self.owner_id).in_parent(ParentFilter::Folder(folder_id));
        let listed = self
            .files
            .list(&filter, SortField::asc(SortKey::CreatedAt), None)
            .await;
        let files = match listed {
            Ok(page) => page.items,
            Err(e) => {
                report.record(NodeKind::Folder, folder_id, &e);
                return false;
            }
        };

        let mut complete = true;
        for file in files {
            if let Err(e) = file.lifecycle_state.apply(Transition::Purge) {
                report.record(NodeKind::File, file.id, &e);
                complete = false;
                continue;
            }
            match purge_file(self.files, self.blobs, &file).await {
                Ok(outcome) => {
                    report.blobs_purged += u64::from(outcome.blob_removed);
                    report.files_changed += u64::from(outcome.row_removed);
                }
                Err(e) => {
                    if e.is(ErrorKind::Storage) {
                        report.record(NodeKind::Blob, file.blob_ref, &e);
                    } else {
                        report.record(NodeKind::File, file.id, &e);
                    }
                    complete = false;
                }
            }
        }
        complete
    }

    /// Returns whether the folder row is gone.
    async fn purge_folder(&self, folder_id: Uuid, report: &mut CascadeReport) -> bool {
        match self.folders.delete_trashed(folder_id, self.owner_id).await {
            Ok(true) => {
                report.folders_changed += 1;
                true
            }
            Ok(false) => match self.folders.find_by_id(folder_id, self.owner_id).await {
                Ok(None) => true,
                Ok(Some(folder)) => {
                    let e = folder
                        .lifecycle_state
                        .apply(Transition::Purge)
                        .err()
                        .unwrap_or_else(|| AppError::internal("Folder could not be removed"));
                    report.record(NodeKind::Folder, folder_id, &e);
                    false
                }
                Err(e) => {
                    report.record(NodeKind::Folder, folder_id, &e);
                    false
                }
            },
            Err(e) => {
                report.record(NodeKind::Folder, folder_id, &e);
                false
            }
        }
    }
}
