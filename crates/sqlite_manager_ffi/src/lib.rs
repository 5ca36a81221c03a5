//! Flutter-facing bindings over `sqlite_manager_core`.

pub mod api;
