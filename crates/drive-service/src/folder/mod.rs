//! Folder tree management and subtree lifecycle cascades.

pub mod cascade;
pub mod service;

pub use cascade::{CascadeFailure, CascadeReport, NodeKind};
pub use service::{CreateFolderRequest, FolderService, UpdateFolderRequest};
