//! Desktop folder layout, used for development hosts and tests.

use super::{FileLocator, Platform};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopLocator {
    data_dir: PathBuf,
    export_dir: PathBuf,
}

impl DesktopLocator {
    pub fn new(data_dir: impl Into<PathBuf>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            export_dir: export_dir.into(),
        }
    }

    /// Resolves the OS special folders for `app_name`.
    ///
    /// Database: `<local data dir>/<app_name>`. Exports: the downloads folder,
    /// else the home folder. Returns `None` when neither base folder is known.
    pub fn detect(app_name: &str) -> Option<Self> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)?
            .join(app_name);
        let export_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| data_dir.clone());
        Some(Self::new(data_dir, export_dir))
    }
}

impl FileLocator for DesktopLocator {
    fn platform(&self) -> Platform {
        Platform::Desktop
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    fn export_dir(&self) -> PathBuf {
        self.export_dir.clone()
    }
}
