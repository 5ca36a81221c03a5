//! Generic record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide table lifecycle and soft-delete CRUD for any `Record` type.
//! - Stamp lifecycle timestamps on every write.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `select_all` never returns tombstoned rows; `select_by_id` does.
//! - Deletes are persisted as updates; no row is ever removed.
//! - Every record of one batch receives the same timestamp.
//! - Batch writes are all-or-nothing.

use super::schema::{
    create_table_sql, insert_sql, insert_values, parse_timestamp, quote, select_sql,
    update_sql, update_values, validate_schema,
};
use crate::clock::{Clock, SystemClock};
use crate::db::{DbConn, DbError};
use crate::model::record::{Record, RecordId, RecordMeta};
use rusqlite::{params_from_iter, Connection, ErrorCode, Params, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::sync::{Arc, MutexGuard};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error distinguishing absence, conflicts and storage faults.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(RecordId),
    AlreadyExists(RecordId),
    InvalidSchema(String),
    InvalidData(String),
    ConnectionPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "record already exists: {id}"),
            Self::InvalidSchema(message) => write!(f, "invalid record schema: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::ConnectionPoisoned => {
                write!(f, "shared connection is poisoned by a panicked writer")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::AlreadyExists(_)
            | Self::InvalidSchema(_)
            | Self::InvalidData(_)
            | Self::ConnectionPoisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table lifecycle and soft-delete CRUD for one record type.
///
/// Write methods stamp the passed records in place before persisting them.
pub trait RecordRepository<R: Record> {
    /// Ensures the backing table exists. Idempotent.
    fn create_table(&self) -> RepoResult<()>;
    /// Removes the backing table. Idempotent.
    fn drop_table(&self) -> RepoResult<()>;
    /// Every non-deleted record.
    fn select_all(&self) -> RepoResult<Vec<R>>;
    /// One record by id, including soft-deleted ones.
    fn select_by_id(&self, id: RecordId) -> RepoResult<Option<R>>;
    fn insert(&self, record: &mut R) -> RepoResult<usize>;
    fn insert_batch(&self, records: &mut [R]) -> RepoResult<usize>;
    fn update(&self, record: &mut R) -> RepoResult<usize>;
    fn update_batch(&self, records: &mut [R]) -> RepoResult<usize>;
    /// Soft delete: sets the tombstone and deletion time, persisted as an update.
    fn delete(&self, record: &mut R) -> RepoResult<usize>;
    fn delete_batch(&self, records: &mut [R]) -> RepoResult<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Insert,
    Update,
}

/// SQLite-backed repository over the shared connection.
pub struct SqliteRecordRepository<R: Record> {
    conn: DbConn,
    clock: Arc<dyn Clock>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for SqliteRecordRepository<R> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            clock: Arc::clone(&self.clock),
            _record: PhantomData,
        }
    }
}

impl<R: Record> SqliteRecordRepository<R> {
    /// Builds a repository stamping with the system clock.
    ///
    /// Fails with `InvalidSchema` when the record declaration is unusable.
    pub fn try_new(conn: DbConn) -> RepoResult<Self> {
        Self::with_clock(conn, Arc::new(SystemClock))
    }

    pub fn with_clock(conn: DbConn, clock: Arc<dyn Clock>) -> RepoResult<Self> {
        validate_schema::<R>()?;
        Ok(Self {
            conn,
            clock,
            _record: PhantomData,
        })
    }

    pub fn connection(&self) -> &DbConn {
        &self.conn
    }

    /// Selects records matching a raw SQL predicate, tombstones included.
    ///
    /// Extension point for record-specific lookups; `predicate` is placed
    /// after `WHERE` verbatim and must use bound parameters for values.
    pub fn select_where<P: Params>(&self, predicate: &str, params: P) -> RepoResult<Vec<R>> {
        let conn = self.lock()?;
        let sql = format!("{} WHERE {predicate};", select_sql::<R>());
        query_records(&conn, &sql, params)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
    }

    fn write_all(&self, records: &[R], kind: WriteKind) -> RepoResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let sql = match kind {
                WriteKind::Insert => insert_sql::<R>(),
                WriteKind::Update => update_sql::<R>(),
            };
            let mut stmt = tx.prepare(&sql)?;
            for record in records {
                let id = record.id();
                match kind {
                    WriteKind::Insert => {
                        let values = insert_values(record)?;
                        written += stmt
                            .execute(params_from_iter(values))
                            .map_err(|err| map_insert_error(err, id))?;
                    }
                    WriteKind::Update => {
                        let values = update_values(record)?;
                        let changed = stmt.execute(params_from_iter(values))?;
                        if changed == 0 {
                            return Err(RepoError::NotFound(id));
                        }
                        written += changed;
                    }
                }
            }
        }
        tx.commit()?;

        Ok(written)
    }
}

impl<R: Record> RecordRepository<R> for SqliteRecordRepository<R> {
    fn create_table(&self) -> RepoResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&create_table_sql::<R>())?;

        let existing = existing_columns(&conn, R::TABLE_NAME)?;
        for column in R::columns() {
            if existing.contains(&column.name.to_ascii_lowercase()) {
                continue;
            }
            conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                quote(R::TABLE_NAME),
                quote(column.name),
                column.kind.sql_type()
            ))?;
        }

        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote(R::TABLE_NAME)))?;
        Ok(())
    }

    fn select_all(&self) -> RepoResult<Vec<R>> {
        let conn = self.lock()?;
        let sql = format!(
            "{} WHERE \"is_deleted\" = 0 ORDER BY \"insert_timestamp\" ASC, \"id\" ASC;",
            select_sql::<R>()
        );
        query_records(&conn, &sql, [])
    }

    fn select_by_id(&self, id: RecordId) -> RepoResult<Option<R>> {
        let conn = self.lock()?;
        let sql = format!("{} WHERE \"id\" = ?1;", select_sql::<R>());
        let mut records = query_records::<R, _>(&conn, &sql, [id.to_string()])?;
        Ok(records.pop())
    }

    fn insert(&self, record: &mut R) -> RepoResult<usize> {
        record.meta_mut().mark_inserted(self.clock.now());
        self.write_all(std::slice::from_ref(record), WriteKind::Insert)
    }

    fn insert_batch(&self, records: &mut [R]) -> RepoResult<usize> {
        let now = self.clock.now();
        for record in records.iter_mut() {
            record.meta_mut().mark_inserted(now);
        }
        self.write_all(records, WriteKind::Insert)
    }

    fn update(&self, record: &mut R) -> RepoResult<usize> {
        record.meta_mut().mark_updated(self.clock.now());
        self.write_all(std::slice::from_ref(record), WriteKind::Update)
    }

    fn update_batch(&self, records: &mut [R]) -> RepoResult<usize> {
        let now = self.clock.now();
        for record in records.iter_mut() {
            record.meta_mut().mark_updated(now);
        }
        self.write_all(records, WriteKind::Update)
    }

    fn delete(&self, record: &mut R) -> RepoResult<usize> {
        record.meta_mut().mark_deleted(self.clock.now());
        self.write_all(std::slice::from_ref(record), WriteKind::Update)
    }

    fn delete_batch(&self, records: &mut [R]) -> RepoResult<usize> {
        let now = self.clock.now();
        for record in records.iter_mut() {
            record.meta_mut().mark_deleted(now);
        }
        self.write_all(records, WriteKind::Update)
    }
}

fn query_records<R: Record, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> RepoResult<Vec<R>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        records.push(parse_record_row(row)?);
    }

    Ok(records)
}

fn parse_record_row<R: Record>(row: &Row<'_>) -> RepoResult<R> {
    let table = R::TABLE_NAME;

    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in {table}.id"))
    })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in {table}.is_deleted"
            )));
        }
    };

    let insert_timestamp = parse_timestamp(
        &row.get::<_, String>("insert_timestamp")?,
        "insert_timestamp",
    )?;
    let update_timestamp = parse_timestamp(
        &row.get::<_, String>("update_timestamp")?,
        "update_timestamp",
    )?;
    let deleted_timestamp = match row.get::<_, Option<String>>("deleted_timestamp")? {
        Some(value) => Some(parse_timestamp(&value, "deleted_timestamp")?),
        None => None,
    };

    let meta = RecordMeta::from_storage(
        id,
        is_deleted,
        insert_timestamp,
        update_timestamp,
        deleted_timestamp,
    );
    R::from_row(meta, row).map_err(|err| match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => {
            RepoError::InvalidData(format!("undecodable {table} row: {err}"))
        }
        other => other.into(),
    })
}

fn existing_columns(conn: &Connection, table: &str) -> RepoResult<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names
        .into_iter()
        .map(|name| name.to_ascii_lowercase())
        .collect())
}

fn map_insert_error(err: rusqlite::Error, id: RecordId) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::AlreadyExists(id)
        }
        _ => err.into(),
    }
}
