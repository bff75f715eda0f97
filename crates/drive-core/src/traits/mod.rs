//! Core traits defined in `drive-core` and implemented by other crates.

pub mod storage;

pub use storage::{BlobMeta, BlobStore, ByteStream, NewBlob};
