//! Database export with filename collision avoidance.
//!
//! # Responsibility
//! - Copy the live database file into the platform export folder.
//! - Never overwrite an existing export.
//!
//! # Invariants
//! - Candidate names are tried in order: plain, `_<YYYYMMDD>`, then fresh
//!   `_<uuid>` tokens, each inserted before the extension.
//! - A candidate is claimed with create-new semantics, so checking for and
//!   taking a name is one step; a concurrent export moves on to the next name.
//! - A failed copy leaves no partial file behind.

use crate::clock::Clock;
use crate::config::{or_default, DEFAULT_EXPORT_EXTENSION, DEFAULT_EXPORT_FILENAME};
use crate::platform::FileLocator;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Unique-token names tried after the date-suffixed name is taken.
pub const MAX_TOKEN_ATTEMPTS: usize = 8;

const DATE_SUFFIX_FORMAT: &str = "%Y%m%d";

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    /// The database file to export does not exist.
    SourceMissing(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Every candidate name in the export folder is taken.
    NoAvailableName {
        directory: PathBuf,
        filename: String,
    },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceMissing(path) => {
                write!(f, "database file not found: {}", path.display())
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::NoAvailableName {
                directory,
                filename,
            } => write!(
                f,
                "no free export name for `{filename}` in {}",
                directory.display()
            ),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::SourceMissing(_) | Self::NoAvailableName { .. } => None,
        }
    }
}

/// Normalizes an export filename and optionally inserts `_<extra>` before
/// its extension.
///
/// - Blank names become [`DEFAULT_EXPORT_FILENAME`].
/// - Names without a dot get `.db3` appended.
pub fn export_filename(requested: &str, extra: Option<&str>) -> String {
    let mut filename = or_default(Some(requested), DEFAULT_EXPORT_FILENAME).to_string();
    if !filename.contains('.') {
        filename = format!("{filename}.{DEFAULT_EXPORT_EXTENSION}");
    }

    match extra.map(str::trim).filter(|extra| !extra.is_empty()) {
        Some(extra) => match filename.rsplit_once('.') {
            Some((stem, extension)) => format!("{stem}_{extra}.{extension}"),
            None => format!("{filename}_{extra}"),
        },
        None => filename,
    }
}

/// Full export path for `requested` inside the locator's export folder.
pub fn export_file_location(
    locator: &dyn FileLocator,
    requested: &str,
    extra: Option<&str>,
) -> PathBuf {
    locator.export_dir().join(export_filename(requested, extra))
}

/// Copies the database file to the export folder and returns the new path.
///
/// # Errors
/// - `SourceMissing` when the database file does not exist.
/// - `NoAvailableName` when every candidate name is taken.
/// - `Io` for folder creation, claim or copy failures.
///
/// # Side effects
/// - Creates the export folder when missing.
/// - Runs the locator's `after_export` hook on success.
/// - Emits `db_export` logging events.
pub fn export_database(
    locator: &dyn FileLocator,
    database_filename: &str,
    requested: &str,
    clock: &dyn Clock,
) -> ExportResult<PathBuf> {
    export_with_tokens(locator, database_filename, requested, clock, || {
        Uuid::new_v4().to_string()
    })
}

/// `export_database` with the unique-token source supplied by the caller.
pub(crate) fn export_with_tokens(
    locator: &dyn FileLocator,
    database_filename: &str,
    requested: &str,
    clock: &dyn Clock,
    new_token: impl FnMut() -> String,
) -> ExportResult<PathBuf> {
    let started_at = Instant::now();
    let platform = locator.platform();
    info!("event=db_export module=export status=start platform={platform}");

    match copy_to_free_name(locator, database_filename, requested, clock, new_token) {
        Ok(path) => {
            locator.after_export(&path);
            info!(
                "event=db_export module=export status=ok platform={} duration_ms={}",
                platform,
                started_at.elapsed().as_millis()
            );
            Ok(path)
        }
        Err(err) => {
            error!(
                "event=db_export module=export status=error platform={} duration_ms={} error={}",
                platform,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Fail-soft export: `None` on any error (legacy `false` + empty path).
pub fn try_export_database(
    locator: &dyn FileLocator,
    database_filename: &str,
    requested: &str,
    clock: &dyn Clock,
) -> Option<PathBuf> {
    export_database(locator, database_filename, requested, clock).ok()
}

fn copy_to_free_name(
    locator: &dyn FileLocator,
    database_filename: &str,
    requested: &str,
    clock: &dyn Clock,
    mut new_token: impl FnMut() -> String,
) -> ExportResult<PathBuf> {
    let source_path = locator.database_file_location(database_filename);
    if !source_path.is_file() {
        return Err(ExportError::SourceMissing(source_path));
    }

    let directory = locator.export_dir();
    std::fs::create_dir_all(&directory).map_err(|source| ExportError::Io {
        path: directory.clone(),
        source,
    })?;

    let date = clock.now().format(DATE_SUFFIX_FORMAT).to_string();
    let suffixes = std::iter::once(None)
        .chain(std::iter::once(Some(date)))
        .chain((0..MAX_TOKEN_ATTEMPTS).map(|_| Some(new_token())));

    for suffix in suffixes {
        let candidate = directory.join(export_filename(requested, suffix.as_deref()));
        let Some(target) = claim(&candidate)? else {
            continue;
        };
        copy_into(&source_path, target, &candidate)?;
        return Ok(candidate);
    }

    Err(ExportError::NoAvailableName {
        directory,
        filename: export_filename(requested, None),
    })
}

/// Creates `path` exclusively; `None` when the name is already taken.
fn claim(path: &Path) -> ExportResult<Option<File>> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(source) => Err(ExportError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn copy_into(source_path: &Path, mut target: File, target_path: &Path) -> ExportResult<()> {
    let result = File::open(source_path)
        .map_err(|source| ExportError::Io {
            path: source_path.to_path_buf(),
            source,
        })
        .and_then(|mut source_file| {
            std::io::copy(&mut source_file, &mut target)
                .and_then(|_| target.sync_all())
                .map_err(|source| ExportError::Io {
                    path: target_path.to_path_buf(),
                    source,
                })
        });

    if result.is_err() {
        drop(target);
        if let Err(cleanup) = std::fs::remove_file(target_path) {
            warn!(
                "event=db_export module=export status=error error_code=cleanup_failed error={}",
                cleanup
            );
        }
    }
    result
}
