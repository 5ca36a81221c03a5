//! Wall-clock source for record lifecycle timestamps and export suffixes.
//!
//! # Responsibility
//! - Provide "now" as local wall-clock time.
//! - Allow callers and tests to pin time explicitly.
//!
//! # Invariants
//! - All timestamps produced by one batch operation come from a single
//!   `now()` call.

use chrono::{Local, NaiveDateTime};
use std::fmt::Debug;

/// Source of local wall-clock time.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Reads the host local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
