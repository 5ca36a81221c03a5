//! iOS folder layout.
//!
//! The database is kept in `Library` (a sibling of `Documents`) so it is not
//! exposed through file sharing; exports go to `Documents`, which is.

use super::{FileLocator, Platform};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosLocator {
    documents_dir: PathBuf,
}

impl IosLocator {
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
        }
    }
}

impl FileLocator for IosLocator {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn data_dir(&self) -> PathBuf {
        match self.documents_dir.parent() {
            Some(container) => container.join("Library"),
            None => self.documents_dir.join("..").join("Library"),
        }
    }

    fn export_dir(&self) -> PathBuf {
        self.documents_dir.clone()
    }
}
