//! One level of a folder's children.

use serde::{Deserialize, Serialize};

use crate::file::File;
use crate::folder::Folder;

/// Direct child folders and files of a folder (or of the root).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderContents {
    pub folders: Vec<Folder>,
    pub files: Vec<File>,
}

impl FolderContents {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}
