//! Record capability and lifecycle metadata.
//!
//! # Responsibility
//! - Define the metadata every persisted record carries.
//! - Define the `Record` capability the generic repository is written against.
//! - Provide lifecycle stamping helpers for insert/update/soft-delete.
//!
//! # Invariants
//! - `id` is assigned at construction and never reassigned.
//! - `update_timestamp >= insert_timestamp`.
//! - `deleted_timestamp >= update_timestamp` when set.
//! - Deletion is a tombstone (`is_deleted`), never a row removal.

use crate::clock::{Clock, SystemClock};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable 128-bit primary key of every record.
pub type RecordId = Uuid;

/// Column names owned by [`RecordMeta`]. Record types must not redeclare them.
pub const RESERVED_COLUMNS: &[&str] = &[
    "id",
    "is_deleted",
    "insert_timestamp",
    "update_timestamp",
    "deleted_timestamp",
];

/// Identity, tombstone flag and lifecycle timestamps shared by all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    id: RecordId,
    /// Soft delete tombstone. Deleted rows stay in storage.
    pub is_deleted: bool,
    /// Local wall-clock time of the last insert.
    pub insert_timestamp: NaiveDateTime,
    /// Local wall-clock time of the last update.
    pub update_timestamp: NaiveDateTime,
    /// Local wall-clock time of the soft delete, if any.
    pub deleted_timestamp: Option<NaiveDateTime>,
}

impl RecordMeta {
    /// Creates metadata with a fresh identifier stamped with the system clock.
    pub fn new() -> Self {
        Self::new_at(SystemClock.now())
    }

    /// Creates metadata with a fresh identifier stamped with `now`.
    pub fn new_at(now: NaiveDateTime) -> Self {
        Self::with_id(Uuid::new_v4(), now)
    }

    /// Creates metadata for a caller-provided identifier.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: RecordId, now: NaiveDateTime) -> Self {
        Self {
            id,
            is_deleted: false,
            insert_timestamp: now,
            update_timestamp: now,
            deleted_timestamp: None,
        }
    }

    /// Rebuilds metadata read back from storage.
    pub(crate) fn from_storage(
        id: RecordId,
        is_deleted: bool,
        insert_timestamp: NaiveDateTime,
        update_timestamp: NaiveDateTime,
        deleted_timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id,
            is_deleted,
            insert_timestamp,
            update_timestamp,
            deleted_timestamp,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns whether the record should be considered visible.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Stamps insert and update time with the same instant.
    pub fn mark_inserted(&mut self, now: NaiveDateTime) {
        self.insert_timestamp = now;
        self.update_timestamp = now;
    }

    /// Refreshes the update time, never moving it before the insert time.
    ///
    /// A tombstone stays a tombstone; its deletion time is raised so it
    /// never precedes the new update time.
    pub fn mark_updated(&mut self, now: NaiveDateTime) {
        self.update_timestamp = now.max(self.insert_timestamp);
        if let Some(deleted) = self.deleted_timestamp.as_mut() {
            *deleted = (*deleted).max(self.update_timestamp);
        }
    }

    /// Tombstones the record, never moving the deletion before the last update.
    pub fn mark_deleted(&mut self, now: NaiveDateTime) {
        self.is_deleted = true;
        self.deleted_timestamp = Some(now.max(self.update_timestamp));
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// SQLite storage class of a declared business column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

/// One declared business column of a record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Real)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn blob(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Blob)
    }
}

/// Capability required by the generic repository: one table per type,
/// metadata access, and conversion of business fields to and from SQLite.
///
/// # Contract
/// - `to_values()` returns one value per entry of `columns()`, in order.
/// - `from_row()` reads business columns by name; metadata is decoded by
///   the repository and handed in.
pub trait Record: Sized {
    /// Backing table name.
    const TABLE_NAME: &'static str;

    /// Business columns, excluding [`RESERVED_COLUMNS`].
    fn columns() -> &'static [Column];

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn to_values(&self) -> Vec<Value>;

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self>;

    fn id(&self) -> RecordId {
        self.meta().id()
    }
}
