//! Sorting types for list endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    /// Accepts `asc`/`desc` and the older boolean form where `false`
    /// means descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "true" | "1" => Ok(Self::Asc),
            "desc" | "descending" | "false" | "-1" => Ok(Self::Desc),
            other => Err(AppError::validation(format!(
                "Invalid sort order '{other}'"
            ))),
        }
    }
}

/// Columns a tree listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    #[default]
    CreatedAt,
    UpdatedAt,
    /// Files only; folders fall back to `CreatedAt`.
    ByteSize,
}

impl SortKey {
    /// The backing column name. Only these fixed strings ever reach SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::ByteSize => "byte_size",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::ByteSize => "byteSize",
        };
        f.write_str(name)
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "name" => Ok(Self::Name),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "updatedAt" | "updated_at" => Ok(Self::UpdatedAt),
            "byteSize" | "byte_size" | "size" => Ok(Self::ByteSize),
            other => Err(AppError::validation(format!("Invalid sort field '{other}'"))),
        }
    }
}

/// A sort key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortField {
    pub key: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn asc(key: SortKey) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn desc(key: SortKey) -> Self {
        Self::new(key, SortDirection::Desc)
    }

    /// Folders have no size; ordering by it degrades to creation time.
    pub fn for_folders(self) -> Self {
        match self.key {
            SortKey::ByteSize => Self::new(SortKey::CreatedAt, self.direction),
            _ => self,
        }
    }
}
