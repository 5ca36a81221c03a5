//! Android folder layout.
//!
//! The database lives in the app's personal folder; exports go to the public
//! Downloads folder. A freshly written export is invisible to the device file
//! browser until the media scanner indexes it, so the host can register a
//! notifier that triggers the scan.

use super::{FileLocator, Platform};
use log::debug;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Host callback asking the media scanner to index one file.
pub type MediaScanNotifier = Arc<dyn Fn(&Path) + Send + Sync>;

#[derive(Clone)]
pub struct AndroidLocator {
    personal_dir: PathBuf,
    downloads_dir: PathBuf,
    media_scan: Option<MediaScanNotifier>,
}

impl AndroidLocator {
    pub fn new(personal_dir: impl Into<PathBuf>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            personal_dir: personal_dir.into(),
            downloads_dir: downloads_dir.into(),
            media_scan: None,
        }
    }

    /// Registers the media scanner hook run after every export.
    pub fn with_media_scan(mut self, notifier: MediaScanNotifier) -> Self {
        self.media_scan = Some(notifier);
        self
    }
}

impl Debug for AndroidLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidLocator")
            .field("personal_dir", &self.personal_dir)
            .field("downloads_dir", &self.downloads_dir)
            .field("media_scan", &self.media_scan.is_some())
            .finish()
    }
}

impl FileLocator for AndroidLocator {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn data_dir(&self) -> PathBuf {
        self.personal_dir.clone()
    }

    fn export_dir(&self) -> PathBuf {
        self.downloads_dir.clone()
    }

    fn after_export(&self, exported: &Path) {
        if let Some(notify) = &self.media_scan {
            debug!("event=media_scan module=platform status=start platform=android");
            notify(exported);
        }
    }
}
