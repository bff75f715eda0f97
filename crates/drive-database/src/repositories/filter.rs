//! Listing filters shared by the folder and file repositories.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use drive_core::types::{PageRequest, SortField};
use drive_entity::{File, Folder, LifecycleState};

/// Restriction on the parent of listed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentFilter {
    /// Anywhere in the owner's tree.
    #[default]
    Any,
    /// Only nodes at the owner's root (`parent_id IS NULL`).
    Root,
    /// Only direct children of the given folder.
    Folder(Uuid),
}

impl ParentFilter {
    /// Root when `parent` is `None`, the folder otherwise.
    pub fn from_parent(parent: Option<Uuid>) -> Self {
        match parent {
            Some(id) => Self::Folder(id),
            None => Self::Root,
        }
    }

    fn matches(&self, parent_id: Option<Uuid>) -> bool {
        match self {
            Self::Any => true,
            Self::Root => parent_id.is_none(),
            Self::Folder(id) => parent_id == Some(*id),
        }
    }
}

/// Conditions for a listing query. The owner is always part of it.
#[derive(Debug, Clone)]
pub struct NodeFilter {
    pub owner_id: String,
    pub parent: ParentFilter,
    pub state: Option<LifecycleState>,
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
}

impl NodeFilter {
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            parent: ParentFilter::Any,
            state: None,
            name_contains: None,
        }
    }

    pub fn in_parent(mut self, parent: ParentFilter) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    /// Blank patterns are ignored.
    pub fn name_contains(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.name_contains = if pattern.trim().is_empty() {
            None
        } else {
            Some(pattern)
        };
        self
    }

    pub fn matches_folder(&self, folder: &Folder) -> bool {
        self.matches(
            &folder.owner_id,
            folder.parent_id,
            folder.lifecycle_state,
            &folder.name,
        )
    }

    pub fn matches_file(&self, file: &File) -> bool {
        self.matches(&file.owner_id, file.parent_id, file.lifecycle_state, &file.name)
    }

    fn matches(
        &self,
        owner_id: &str,
        parent_id: Option<Uuid>,
        state: LifecycleState,
        name: &str,
    ) -> bool {
        owner_id == self.owner_id
            && self.parent.matches(parent_id)
            && self.state.is_none_or(|s| s == state)
            && self
                .name_contains
                .as_ref()
                .is_none_or(|p| name.to_lowercase().contains(&p.to_lowercase()))
    }
}

/// Append the `WHERE` clause for `filter`.
pub(crate) fn push_where(query: &mut QueryBuilder<'_, Postgres>, filter: &NodeFilter) {
    query.push(" WHERE owner_id = ");
    query.push_bind(filter.owner_id.clone());
    match filter.parent {
        ParentFilter::Any => {}
        ParentFilter::Root => {
            query.push(" AND parent_id IS NULL");
        }
        ParentFilter::Folder(id) => {
            query.push(" AND parent_id = ");
            query.push_bind(id);
        }
    }
    if let Some(state) = filter.state {
        query.push(" AND lifecycle_state = ");
        query.push_bind(state);
    }
    if let Some(pattern) = &filter.name_contains {
        query.push(" AND name ILIKE ");
        query.push_bind(like_pattern(pattern));
        query.push(" ESCAPE '\\'");
    }
}

/// Append `ORDER BY` and, when paging, `LIMIT`/`OFFSET`.
pub(crate) fn push_order_and_page(
    query: &mut QueryBuilder<'_, Postgres>,
    sort: SortField,
    page: Option<PageRequest>,
) {
    query.push(" ORDER BY ");
    query.push(sort.key.column());
    query.push(" ");
    query.push(sort.direction.as_sql());
    query.push(", id ASC");
    if let Some(page) = page {
        query.push(" LIMIT ");
        query.push_bind(page.limit() as i64);
        query.push(" OFFSET ");
        query.push_bind(page.offset() as i64);
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    escaped.push('%');
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
