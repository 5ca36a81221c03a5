//! Sample app domain: users stored through the generic record repository.
//!
//! # Responsibility
//! - Declare the `User` record and its table mapping.
//! - Add the username/password lookup on top of the generic CRUD.
//!
//! # Invariants
//! - Username matching is case-insensitive; password matching is exact.
//! - Tombstoned users never log in.

use log::info;
use rusqlite::types::Value;
use rusqlite::Row;
use sqlite_manager_core::{
    Column, Database, Record, RecordMeta, RecordRepository, RepoResult, SqliteRecordRepository,
};

/// Database filename used by the sample app.
pub const SAMPLE_DATABASE_FILENAME: &str = "SQLiteSample.db3";

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub meta: RecordMeta,
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::new(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Record for User {
    const TABLE_NAME: &'static str = "users";

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[Column::text("username"), Column::text("password")];
        COLUMNS
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.username.clone()),
            Value::Text(self.password.clone()),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            meta,
            username: row.get("username")?,
            password: row.get("password")?,
        })
    }
}

/// User data access: generic CRUD plus credential lookup.
#[derive(Clone)]
pub struct UserRepository {
    inner: SqliteRecordRepository<User>,
}

impl UserRepository {
    /// Binds to the facade's shared connection and ensures the `users` table.
    pub fn new(database: &Database) -> RepoResult<Self> {
        Ok(Self {
            inner: database.repository::<User>()?,
        })
    }

    pub fn records(&self) -> &SqliteRecordRepository<User> {
        &self.inner
    }

    /// First active user matching `username` (any case) and `password`.
    pub fn select_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> RepoResult<Option<User>> {
        let mut found = self.inner.select_where(
            "lower(\"username\") = lower(?1) AND \"password\" = ?2 AND \"is_deleted\" = 0 \
             ORDER BY \"insert_timestamp\", \"id\" LIMIT 1",
            [username, password],
        )?;
        Ok(found.pop())
    }

    /// Inserts the built-in accounts when the table has no active user.
    ///
    /// Returns the number of inserted users.
    pub fn seed_defaults(&self) -> RepoResult<usize> {
        if !self.inner.select_all()?.is_empty() {
            return Ok(0);
        }
        let mut users = default_users();
        let inserted = self.inner.insert_batch(&mut users)?;
        info!(
            "event=users_seed module=sample status=ok inserted={}",
            inserted
        );
        Ok(inserted)
    }
}

/// Built-in sample accounts.
pub fn default_users() -> Vec<User> {
    vec![
        User::new("Admin", "Admin"),
        User::new("User", "User"),
        User::new("Guest", "Guest"),
    ]
}
