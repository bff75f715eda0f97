//! # drive-entity
//!
//! Domain entity models for Drive. Every struct in this crate represents a
//! database table row or a domain value object. Row types derive
//! `sqlx::FromRow` and serialize with camelCase keys.

pub mod contents;
pub mod file;
pub mod folder;
pub mod lifecycle;

pub use contents::FolderContents;
pub use file::{CreateFile, File, FileMetadata, UpdateFile};
pub use folder::{CreateFolder, Folder, UpdateFolder};
pub use lifecycle::{LifecycleState, Transition, TransitionOutcome};
