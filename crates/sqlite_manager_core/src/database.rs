//! Database facade: explicit context tying locator, configuration, shared
//! connection and export together.
//!
//! # Responsibility
//! - Own the platform locator and filename configuration for one app.
//! - Hand out repositories bound to the shared connection.
//! - Expose export entry points using the configured filenames.
//!
//! # Invariants
//! - Construct once at startup and pass it to consumers; there is no global.
//! - The connection is opened on first use and lives as long as the facade.

use crate::clock::{Clock, SystemClock};
use crate::config::DatabaseConfig;
use crate::db::{ConnectionProvider, DbConn, DbResult};
use crate::export::{export_database, try_export_database, ExportResult};
use crate::model::record::Record;
use crate::platform::FileLocator;
use crate::repo::fail_soft::FailSoftRepository;
use crate::repo::record_repo::{RecordRepository, RepoResult, SqliteRecordRepository};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Database {
    config: DatabaseConfig,
    locator: Arc<dyn FileLocator>,
    provider: ConnectionProvider,
    clock: Arc<dyn Clock>,
}

impl Database {
    pub fn new(locator: Arc<dyn FileLocator>, config: DatabaseConfig) -> Self {
        Self::with_clock(locator, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        locator: Arc<dyn FileLocator>,
        config: DatabaseConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let provider = ConnectionProvider::new(
            Arc::clone(&locator),
            config.database_filename().to_string(),
        );
        Self {
            config,
            locator,
            provider,
            clock,
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn locator(&self) -> &dyn FileLocator {
        self.locator.as_ref()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Path of the configured database file.
    pub fn database_path(&self) -> PathBuf {
        self.provider.database_path()
    }

    /// Shared connection, opened on first call.
    pub fn connection(&self) -> DbResult<DbConn> {
        self.provider.get_connection()
    }

    /// Repository for `R` on the shared connection, with its table ensured.
    pub fn repository<R: Record>(&self) -> RepoResult<SqliteRecordRepository<R>> {
        let repo = SqliteRecordRepository::with_clock(self.connection()?, self.clock())?;
        repo.create_table()?;
        Ok(repo)
    }

    /// Fail-soft repository for callers that want the legacy contract.
    pub fn fail_soft_repository<R: Record>(
        &self,
    ) -> RepoResult<FailSoftRepository<R, SqliteRecordRepository<R>>> {
        self.repository::<R>().map(FailSoftRepository::new)
    }

    /// Exports the configured database under the configured export name.
    pub fn export_database(&self) -> ExportResult<PathBuf> {
        self.export_database_from(self.config.database_filename(), self.config.export_filename())
    }

    /// Exports the configured database under `export_filename`.
    pub fn export_database_as(&self, export_filename: &str) -> ExportResult<PathBuf> {
        self.export_database_from(self.config.database_filename(), export_filename)
    }

    /// Exports an arbitrary database file from the data folder.
    pub fn export_database_from(
        &self,
        database_filename: &str,
        export_filename: &str,
    ) -> ExportResult<PathBuf> {
        export_database(
            self.locator.as_ref(),
            database_filename,
            export_filename,
            self.clock.as_ref(),
        )
    }

    /// Fail-soft `export_database`.
    pub fn try_export_database(&self) -> Option<PathBuf> {
        self.try_export_database_as(self.config.export_filename())
    }

    /// Fail-soft `export_database_as`.
    pub fn try_export_database_as(&self, export_filename: &str) -> Option<PathBuf> {
        try_export_database(
            self.locator.as_ref(),
            self.config.database_filename(),
            export_filename,
            self.clock.as_ref(),
        )
    }
}
