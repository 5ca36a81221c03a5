//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose logging setup, database initialization and export to Dart via FRB.
//! - Own the process-wide `Database` used by host-side calls.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The database is initialized at most once per process; repeating the same
//!   initialization is a no-op, a different one is rejected.
//! - Return values are UTF-8 strings or plain envelopes with stable meaning.

use log::{info, warn};
use sqlite_manager_core::{
    build_locator, core_version as core_version_inner, init_logging as init_logging_inner,
    Database, DatabaseConfig, Platform,
};
use std::path::PathBuf;
use std::sync::OnceLock;

static DATABASE: OnceLock<InitializedDatabase> = OnceLock::new();

struct InitializedDatabase {
    request: InitRequest,
    database: Database,
}

/// Normalized `init_database` arguments, compared on repeated calls.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InitRequest {
    platform: Platform,
    base_dir: PathBuf,
    export_dir: Option<PathBuf>,
    config: DatabaseConfig,
}

impl InitRequest {
    fn parse(
        platform: &str,
        base_dir: &str,
        export_dir: Option<String>,
        database_filename: Option<String>,
        export_filename: Option<String>,
    ) -> Result<Self, String> {
        let platform = platform
            .parse::<Platform>()
            .map_err(|err| err.to_string())?;
        let base_dir = base_dir.trim();
        if base_dir.is_empty() {
            return Err("base_dir must not be empty".to_string());
        }

        let mut config = DatabaseConfig::new();
        if let Some(filename) = non_blank(database_filename) {
            config = config.with_database_filename(filename);
        }
        if let Some(filename) = non_blank(export_filename) {
            config = config.with_export_filename(filename);
        }

        Ok(Self {
            platform,
            base_dir: PathBuf::from(base_dir),
            export_dir: non_blank(export_dir).map(PathBuf::from),
            config,
        })
    }

    fn build(&self) -> Database {
        let locator = build_locator(self.platform, &self.base_dir, self.export_dir.clone());
        Database::new(locator, self.config.clone())
    }
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - UI-thread safe for current implementation.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Initializes the process-wide database from host-provided folders.
///
/// Input semantics:
/// - `platform`: `android|ios|windows|desktop` (case-insensitive).
/// - `base_dir`: Android personal folder, iOS Documents folder, Windows local
///   folder, or desktop data folder.
/// - `export_dir`: Android downloads folder or desktop export folder; ignored
///   on iOS and Windows.
/// - blank or absent filenames fall back to the core defaults.
///
/// # FFI contract
/// - Sync call; does not open the database file.
/// - Safe to call repeatedly with the same arguments (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_database(
    platform: String,
    base_dir: String,
    export_dir: Option<String>,
    database_filename: Option<String>,
    export_filename: Option<String>,
) -> String {
    let request = match InitRequest::parse(
        &platform,
        &base_dir,
        export_dir,
        database_filename,
        export_filename,
    ) {
        Ok(request) => request,
        Err(err) => return format!("init_database failed: {err}"),
    };

    let state = DATABASE.get_or_init(|| {
        let database = request.build();
        info!(
            "event=ffi_init_database module=ffi status=ok platform={} db_path={}",
            request.platform,
            database.database_path().display()
        );
        InitializedDatabase {
            request: request.clone(),
            database,
        }
    });

    if state.request == request {
        String::new()
    } else {
        warn!(
            "event=ffi_init_database module=ffi status=error reason=conflict active_platform={} requested_platform={}",
            state.request.platform, request.platform
        );
        "init_database failed: database already initialized with different settings".to_string()
    }
}

/// Returns the configured database file path.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; returns empty string before `init_database`.
#[flutter_rust_bridge::frb(sync)]
pub fn database_path() -> String {
    DATABASE
        .get()
        .map(|state| state.database.database_path().display().to_string())
        .unwrap_or_default()
}

/// Export response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    /// Whether a copy was written.
    pub ok: bool,
    /// Path of the written copy.
    pub path: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ExportResponse {
    fn success(path: String) -> Self {
        Self {
            ok: true,
            message: format!("Database exported to {path}."),
            path: Some(path),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            path: None,
            message: message.into(),
        }
    }
}

/// Copies the database to the platform export folder.
///
/// Input semantics:
/// - `export_filename`: target name; blank or absent uses the configured
///   export filename. A taken name gets a date suffix, then a unique token.
///
/// # FFI contract
/// - Sync call; copies the whole database file.
/// - Never overwrites an existing file.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn export_database(export_filename: Option<String>) -> ExportResponse {
    export_with(
        DATABASE.get().map(|state| &state.database),
        non_blank(export_filename),
    )
}

fn export_with(database: Option<&Database>, export_filename: Option<String>) -> ExportResponse {
    let Some(database) = database else {
        return ExportResponse::failure("export_database failed: database not initialized");
    };
    let result = match export_filename {
        Some(filename) => database.export_database_as(&filename),
        None => database.export_database(),
    };
    match result {
        Ok(path) => ExportResponse::success(path.display().to_string()),
        Err(err) => ExportResponse::failure(format!("export_database failed: {err}")),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
