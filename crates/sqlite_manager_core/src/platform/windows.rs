//! Windows / Windows Phone folder layout.
//!
//! Sandboxed Windows apps only own their local application folder, so the
//! database and its exports share it.

use super::{FileLocator, Platform};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowsLocator {
    local_folder: PathBuf,
}

impl WindowsLocator {
    pub fn new(local_folder: impl Into<PathBuf>) -> Self {
        Self {
            local_folder: local_folder.into(),
        }
    }
}

impl FileLocator for WindowsLocator {
    fn platform(&self) -> Platform {
        Platform::Windows
    }

    fn data_dir(&self) -> PathBuf {
        self.local_folder.clone()
    }

    fn export_dir(&self) -> PathBuf {
        self.local_folder.clone()
    }
}
