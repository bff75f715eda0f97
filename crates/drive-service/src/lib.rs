//! # drive-service
//!
//! Business logic for Drive. Each service orchestrates the repositories
//! and the blob store to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod folder;
pub mod links;
pub mod listing;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::RequestContext;
pub use file::{DownloadService, FileService, UploadService};
pub use folder::{CascadeReport, FolderService};
pub use links::DownloadLinks;
pub use listing::ListingService;
