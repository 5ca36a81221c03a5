//! Platform-specific database and export folder resolution.
//!
//! # Responsibility
//! - Map a database filename to its on-disk location per platform.
//! - Provide the public folder that database exports are written to.
//!
//! # Invariants
//! - Path resolution is a pure join; nothing is created or probed here.
//! - Locators are constructed explicitly by the host and passed down.

use crate::config::{or_default, DEFAULT_DATABASE_FILENAME};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

mod android;
mod desktop;
mod ios;
mod windows;

pub use android::{AndroidLocator, MediaScanNotifier};
pub use desktop::DesktopLocator;
pub use ios::IosLocator;
pub use windows::WindowsLocator;

/// Target platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Android,
    Ios,
    Windows,
    Desktop,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Windows => "windows",
            Self::Desktop => "desktop",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown platform name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedPlatform(pub String);

impl Display for UnsupportedPlatform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported platform `{}`; expected android|ios|windows|desktop",
            self.0
        )
    }
}

impl Error for UnsupportedPlatform {}

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "android" | "droid" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            "windows" | "winphone" | "uwp" => Ok(Self::Windows),
            "desktop" | "linux" | "macos" => Ok(Self::Desktop),
            other => Err(UnsupportedPlatform(other.to_string())),
        }
    }
}

/// Resolves where the database lives and where exports go.
pub trait FileLocator: Send + Sync {
    fn platform(&self) -> Platform;

    /// Application-private directory holding the database file.
    fn data_dir(&self) -> PathBuf;

    /// User-visible directory receiving exported copies.
    fn export_dir(&self) -> PathBuf;

    /// Joins the data directory with `database_filename` (default when blank).
    fn database_file_location(&self, database_filename: &str) -> PathBuf {
        self.data_dir()
            .join(or_default(Some(database_filename), DEFAULT_DATABASE_FILENAME))
    }

    /// Called after an export file has been fully written.
    fn after_export(&self, _exported: &Path) {}
}

/// Builds the locator for `platform` from host-provided folders.
///
/// - Android: `base_dir` is the personal folder, `export_dir` the downloads
///   folder (falls back to `base_dir`).
/// - iOS: `base_dir` is the Documents folder; `export_dir` is ignored.
/// - Windows: `base_dir` is the local app folder; `export_dir` is ignored.
/// - Desktop: `base_dir` holds the database, `export_dir` receives exports
///   (falls back to `base_dir`).
pub fn build_locator(
    platform: Platform,
    base_dir: impl Into<PathBuf>,
    export_dir: Option<PathBuf>,
) -> Arc<dyn FileLocator> {
    let base_dir = base_dir.into();
    match platform {
        Platform::Android => {
            let downloads = export_dir.unwrap_or_else(|| base_dir.clone());
            Arc::new(AndroidLocator::new(base_dir, downloads))
        }
        Platform::Ios => Arc::new(IosLocator::new(base_dir)),
        Platform::Windows => Arc::new(WindowsLocator::new(base_dir)),
        Platform::Desktop => {
            let exports = export_dir.unwrap_or_else(|| base_dir.clone());
            Arc::new(DesktopLocator::new(base_dir, exports))
        }
    }
}
