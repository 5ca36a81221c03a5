//! Core of the SQLite manager: a generic soft-delete repository over a local
//! SQLite file, plus per-platform database location and export.

pub mod clock;
pub mod config;
pub mod database;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod platform;
pub mod repo;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{DatabaseConfig, DEFAULT_DATABASE_FILENAME, DEFAULT_EXPORT_FILENAME};
pub use database::Database;
pub use db::{ConnectionProvider, DbConn, DbError, DbResult};
pub use export::{export_database, try_export_database, ExportError, ExportResult};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::record::{Column, ColumnKind, Record, RecordId, RecordMeta};
pub use platform::{
    build_locator, AndroidLocator, DesktopLocator, FileLocator, IosLocator, Platform,
    WindowsLocator,
};
pub use repo::fail_soft::FailSoftRepository;
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
