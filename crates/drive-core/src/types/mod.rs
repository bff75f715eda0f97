//! Core type definitions used across the Drive workspace.

pub mod pagination;
pub mod sorting;

pub use pagination::{PageRequest, PageResponse};
pub use sorting::{SortDirection, SortField, SortKey};
