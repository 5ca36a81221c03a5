//! Record model shared by every persisted type.
//!
//! # Responsibility
//! - Define identity and lifecycle metadata common to all records.
//! - Define the capability the generic repository is written against.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod record;
