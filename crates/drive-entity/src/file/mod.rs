//! File domain entities.

pub mod metadata;
pub mod model;

pub use metadata::FileMetadata;
pub use model::{CreateFile, File, UpdateFile};
