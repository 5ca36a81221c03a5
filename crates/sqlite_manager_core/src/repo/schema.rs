//! Table schema and SQL text derived from a `Record` declaration.
//!
//! # Invariants
//! - Only identifiers matching `[A-Za-z_][A-Za-z0-9_]*` reach SQL text.
//! - Metadata columns always come first, in `RESERVED_COLUMNS` order.

use super::record_repo::{RepoError, RepoResult};
use crate::model::record::{Record, RecordMeta, RESERVED_COLUMNS};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use std::collections::HashSet;

const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Rejects record declarations that cannot be mapped to a table safely.
pub(crate) fn validate_schema<R: Record>() -> RepoResult<()> {
    let table = R::TABLE_NAME;
    if !IDENTIFIER_RE.is_match(table) {
        return Err(RepoError::InvalidSchema(format!(
            "invalid table name `{table}`"
        )));
    }
    if table.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(RepoError::InvalidSchema(format!(
            "table name `{table}` uses the reserved sqlite_ prefix"
        )));
    }

    let mut seen = HashSet::new();
    for column in R::columns() {
        if !IDENTIFIER_RE.is_match(column.name) {
            return Err(RepoError::InvalidSchema(format!(
                "invalid column name `{}` in `{table}`",
                column.name
            )));
        }
        let normalized = column.name.to_ascii_lowercase();
        if RESERVED_COLUMNS.contains(&normalized.as_str()) {
            return Err(RepoError::InvalidSchema(format!(
                "column `{}` in `{table}` is reserved for record metadata",
                column.name
            )));
        }
        if !seen.insert(normalized) {
            return Err(RepoError::InvalidSchema(format!(
                "duplicate column `{}` in `{table}`",
                column.name
            )));
        }
    }

    Ok(())
}

pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

pub(crate) fn create_table_sql<R: Record>() -> String {
    let mut columns = vec![
        "\"id\" TEXT PRIMARY KEY NOT NULL".to_string(),
        "\"is_deleted\" INTEGER NOT NULL DEFAULT 0".to_string(),
        "\"insert_timestamp\" TEXT NOT NULL".to_string(),
        "\"update_timestamp\" TEXT NOT NULL".to_string(),
        "\"deleted_timestamp\" TEXT".to_string(),
    ];
    columns.extend(
        R::columns()
            .iter()
            .map(|column| format!("{} {}", quote(column.name), column.kind.sql_type())),
    );

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
        quote(R::TABLE_NAME),
        columns.join(",\n    ")
    )
}

pub(crate) fn column_names<R: Record>() -> Vec<&'static str> {
    RESERVED_COLUMNS
        .iter()
        .copied()
        .chain(R::columns().iter().map(|column| column.name))
        .collect()
}

pub(crate) fn select_sql<R: Record>() -> String {
    let columns = column_names::<R>()
        .into_iter()
        .map(quote)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {columns} FROM {}", quote(R::TABLE_NAME))
}

pub(crate) fn insert_sql<R: Record>() -> String {
    let names = column_names::<R>();
    let placeholders = (1..=names.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let columns = names.into_iter().map(quote).collect::<Vec<_>>().join(", ");
    format!(
        "INSERT INTO {} ({columns}) VALUES ({placeholders});",
        quote(R::TABLE_NAME)
    )
}

/// `UPDATE` of every column but `id`; the id binds last.
pub(crate) fn update_sql<R: Record>() -> String {
    let names = column_names::<R>();
    let assignments = names
        .iter()
        .skip(1)
        .enumerate()
        .map(|(index, name)| format!("{} = ?{}", quote(name), index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {assignments} WHERE \"id\" = ?{};",
        quote(R::TABLE_NAME),
        names.len()
    )
}

/// Metadata values in `RESERVED_COLUMNS` order.
pub(crate) fn meta_values(meta: &RecordMeta) -> Vec<Value> {
    vec![
        Value::Text(meta.id().to_string()),
        Value::Integer(i64::from(meta.is_deleted)),
        Value::Text(format_timestamp(meta.insert_timestamp)),
        Value::Text(format_timestamp(meta.update_timestamp)),
        meta.deleted_timestamp
            .map_or(Value::Null, |ts| Value::Text(format_timestamp(ts))),
    ]
}

/// Bind values for `insert_sql`: metadata followed by business columns.
pub(crate) fn insert_values<R: Record>(record: &R) -> RepoResult<Vec<Value>> {
    let mut values = meta_values(record.meta());
    values.extend(business_values(record)?);
    Ok(values)
}

/// Bind values for `update_sql`: everything but the id, then the id.
pub(crate) fn update_values<R: Record>(record: &R) -> RepoResult<Vec<Value>> {
    let mut values = meta_values(record.meta());
    let id = values.remove(0);
    values.extend(business_values(record)?);
    values.push(id);
    Ok(values)
}

fn business_values<R: Record>(record: &R) -> RepoResult<Vec<Value>> {
    let values = record.to_values();
    if values.len() != R::columns().len() {
        return Err(RepoError::InvalidSchema(format!(
            "`{}` produced {} values for {} declared columns",
            R::TABLE_NAME,
            values.len(),
            R::columns().len()
        )));
    }
    Ok(values)
}

pub(crate) fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_WRITE_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> RepoResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_READ_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in {column}"))
    })
}
