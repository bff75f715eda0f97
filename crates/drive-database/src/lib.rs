//! # drive-database
//!
//! PostgreSQL connection management and the repository layer for folders
//! and files. Each repository is a trait with a PostgreSQL implementation
//! and an in-memory implementation with the same filter semantics.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{
    FileRepository, FolderRepository, MemoryFileRepository, MemoryFolderRepository, NodeFilter,
    ParentFilter, PgFileRepository, PgFolderRepository,
};
