//! Builds externally visible download links.

use uuid::Uuid;

/// Turns blob ids into absolute download URLs.
#[derive(Debug, Clone)]
pub struct DownloadLinks {
    base_url: String,
}

impl DownloadLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Download path keyed by the blob id.
    pub fn blob_url(&self, blob_id: Uuid) -> String {
        format!("{}/api/files/blob/{blob_id}", self.base_url)
    }

    /// Link stored on image files for inline display; `None` otherwise.
    pub fn public_url(&self, blob_id: Uuid, mime_type: &str) -> Option<String> {
        mime_type
            .starts_with("image/")
            .then(|| self.blob_url(blob_id))
    }
}
