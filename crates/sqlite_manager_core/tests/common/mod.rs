#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::Row;
use sqlite_manager_core::{Column, Record, RecordMeta};

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub meta: RecordMeta,
    pub title: String,
    pub body: Option<String>,
    pub priority: i64,
}

impl Note {
    pub fn new(title: &str) -> Self {
        Self {
            meta: RecordMeta::new(),
            title: title.to_string(),
            body: None,
            priority: 0,
        }
    }
}

impl Record for Note {
    const TABLE_NAME: &'static str = "notes";

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::text("title"),
            Column::text("body"),
            Column::integer("priority"),
        ];
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
            Value::Text(self.title.clone()),
            self.body.clone().map_or(Value::Null, Value::Text),
            Value::Integer(self.priority),
        ]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            meta,
            title: row.get("title")?,
            body: row.get("body")?,
            priority: row.get("priority")?,
        })
    }
}

/// Earlier shape of `Note`, sharing its table but lacking later columns.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteV1 {
    pub meta: RecordMeta,
    pub title: String,
}

impl Record for NoteV1 {
    const TABLE_NAME: &'static str = "notes";

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[Column::text("title")];
        COLUMNS
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Text(self.title.clone())]
    }

    fn from_row(meta: RecordMeta, row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            meta,
            title: row.get("title")?,
        })
    }
}

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid test timestamp")
}
