//! Error-absorbing compatibility layer over a strict repository.
//!
//! # Responsibility
//! - Reproduce the legacy contract where no repository call ever fails:
//!   table operations return `bool`, reads return empty/absent results and
//!   writes return a row count of `0` on any error.
//!
//! # Invariants
//! - Every operation goes through `perform`; nothing escapes as an error.
//! - Absorbed errors are logged, so a storage fault is still diagnosable even
//!   though the caller cannot tell it apart from "not found".

use super::record_repo::{RecordRepository, RepoResult};
use crate::model::record::{Record, RecordId};
use log::warn;
use std::marker::PhantomData;

pub struct FailSoftRepository<R: Record, P: RecordRepository<R>> {
    inner: P,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, P: RecordRepository<R>> FailSoftRepository<R, P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            _record: PhantomData,
        }
    }

    /// Returns the wrapped strict repository.
    pub fn strict(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    /// `true` when the table exists afterwards.
    pub fn create_table(&self) -> bool {
        perform::<R, _>("create_table", || self.inner.create_table().map(|()| true))
    }

    /// `true` when the table is gone afterwards.
    pub fn drop_table(&self) -> bool {
        perform::<R, _>("drop_table", || self.inner.drop_table().map(|()| true))
    }

    pub fn select_all(&self) -> Vec<R> {
        perform::<R, _>("select_all", || self.inner.select_all())
    }

    pub fn select_by_id(&self, id: RecordId) -> Option<R> {
        perform::<R, _>("select_by_id", || self.inner.select_by_id(id))
    }

    pub fn insert(&self, record: &mut R) -> usize {
        perform::<R, _>("insert", || self.inner.insert(record))
    }

    pub fn insert_batch(&self, records: &mut [R]) -> usize {
        perform::<R, _>("insert_batch", || self.inner.insert_batch(records))
    }

    pub fn update(&self, record: &mut R) -> usize {
        perform::<R, _>("update", || self.inner.update(record))
    }

    pub fn update_batch(&self, records: &mut [R]) -> usize {
        perform::<R, _>("update_batch", || self.inner.update_batch(records))
    }

    pub fn delete(&self, record: &mut R) -> usize {
        perform::<R, _>("delete", || self.inner.delete(record))
    }

    pub fn delete_batch(&self, records: &mut [R]) -> usize {
        perform::<R, _>("delete_batch", || self.inner.delete_batch(records))
    }
}

/// Runs one repository call, converting any error into `T::default()`.
pub fn perform<R: Record, T: Default>(op: &str, call: impl FnOnce() -> RepoResult<T>) -> T {
    match call() {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=repo_fail_soft module=repo status=error op={} table={} error={}",
                op,
                R::TABLE_NAME,
                err
            );
            T::default()
        }
    }
}
