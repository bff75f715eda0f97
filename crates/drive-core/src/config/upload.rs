//! Upload limits.

use serde::{Deserialize, Serialize};

/// Limits applied to uploaded content before anything is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum size of a single uploaded file (default 5 MB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum size of each file in a batch upload (default 10 MB).
    #[serde(default = "default_max_batch_file_size")]
    pub max_batch_file_size_bytes: u64,
    /// Maximum number of files in one batch upload.
    #[serde(default = "default_max_batch_files")]
    pub max_batch_files: usize,
    /// Accepted file extensions, lowercase, with the leading dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    /// Upper bound for a whole multipart request body.
    pub fn max_request_body_bytes(&self) -> usize {
        let files = self.max_batch_file_size_bytes * self.max_batch_files.max(1) as u64;
        // multipart framing and form fields
        (files + 1024 * 1024) as usize
    }

    /// Whether `extension` (with or without the dot, any case) is accepted.
    pub fn allows_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            max_batch_file_size_bytes: default_max_batch_file_size(),
            max_batch_files: default_max_batch_files(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_max_batch_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_batch_files() -> usize {
    10
}

fn default_allowed_extensions() -> Vec<String> {
    [
        ".txt", ".doc", ".docx", ".pdf", ".ppt", ".pptx", ".xls", ".xlsx", ".jpg", ".jpeg",
        ".png", ".gif", ".bmp", ".webp", ".svg",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}
