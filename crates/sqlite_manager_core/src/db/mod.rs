//! SQLite storage bootstrap and shared connection handle.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Own the single shared connection handle used by all repositories.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - The journal stays in rollback mode so the database file alone is a
//!   complete copy for export.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

mod open;
mod provider;

pub use open::{open_db, open_db_in_memory, open_shared, open_shared_in_memory};
pub use provider::ConnectionProvider;

/// Shared connection handle. SQLite serializes access through the mutex.
pub type DbConn = Arc<Mutex<Connection>>;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
