//! Repository layer: one generic soft-delete repository for every record type.
//!
//! # Responsibility
//! - Define the record repository contract and its SQLite implementation.
//! - Offer the legacy fail-soft contract as an opt-in wrapper.
//!
//! # Invariants
//! - The strict API distinguishes "not found" from storage errors.
//! - Table schema is derived from the `Record` declaration only.

pub mod fail_soft;
pub mod record_repo;
mod schema;
