//! Lazily opened, process-lifetime shared connection.
//!
//! # Responsibility
//! - Bind the database file resolved by a platform locator to one handle.
//! - Hand out clones of that handle to every repository.
//!
//! # Invariants
//! - At most one connection is opened per provider, even under concurrent
//!   first calls.
//! - A failed open leaves the provider unopened so a later call may retry.

use super::{open_shared, DbConn, DbResult};
use crate::platform::FileLocator;
use log::info;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ConnectionProvider {
    locator: Arc<dyn FileLocator>,
    database_filename: String,
    conn: OnceCell<DbConn>,
}

impl ConnectionProvider {
    pub fn new(locator: Arc<dyn FileLocator>, database_filename: impl Into<String>) -> Self {
        Self {
            locator,
            database_filename: database_filename.into(),
            conn: OnceCell::new(),
        }
    }

    /// Full path of the database file this provider connects to.
    pub fn database_path(&self) -> PathBuf {
        self.locator
            .database_file_location(self.database_filename.as_str())
    }

    /// Returns the shared connection, opening it on first use.
    pub fn get_connection(&self) -> DbResult<DbConn> {
        let conn = self.conn.get_or_try_init(|| -> DbResult<DbConn> {
            let path = self.database_path();
            let conn = open_shared(&path)?;
            info!(
                "event=connection_open module=db status=ok platform={}",
                self.locator.platform()
            );
            Ok(conn)
        })?;
        Ok(Arc::clone(conn))
    }

    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }
}
