//! File registry: records, uploads and downloads.

pub mod download;
pub mod service;
pub mod upload;

pub use download::{Download, DownloadService};
pub use service::{CreateFileRequest, FileService, UpdateFileRequest};
pub use upload::{
    BlobReceipt, ManifestEntry, ManifestError, UploadManifest, UploadReceipt, UploadService,
    UploadedFile,
};
