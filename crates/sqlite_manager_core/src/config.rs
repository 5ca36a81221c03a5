//! Database file naming configuration.
//!
//! # Responsibility
//! - Hold the database filename and default export filename.
//! - Fall back to built-in defaults for unset or blank values.
//!
//! # Invariants
//! - Getters never return a blank filename.

/// Database filename used when none is configured.
pub const DEFAULT_DATABASE_FILENAME: &str = "my_database.db3";
/// Export filename used when none is configured.
pub const DEFAULT_EXPORT_FILENAME: &str = "Database.db3";
/// Extension appended to export filenames that carry none.
pub const DEFAULT_EXPORT_EXTENSION: &str = "db3";

/// Environment override for the database filename.
pub const DATABASE_FILENAME_ENV: &str = "SQLITE_MANAGER_DATABASE_FILENAME";
/// Environment override for the export filename.
pub const EXPORT_FILENAME_ENV: &str = "SQLITE_MANAGER_EXPORT_FILENAME";

/// Filenames used by the facade for the live database and its exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    database_filename: Option<String>,
    export_filename: Option<String>,
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads both filenames from the environment; unset variables keep defaults.
    pub fn from_env() -> Self {
        Self {
            database_filename: std::env::var(DATABASE_FILENAME_ENV).ok(),
            export_filename: std::env::var(EXPORT_FILENAME_ENV).ok(),
        }
    }

    pub fn with_database_filename(mut self, filename: impl Into<String>) -> Self {
        self.database_filename = Some(filename.into());
        self
    }

    pub fn with_export_filename(mut self, filename: impl Into<String>) -> Self {
        self.export_filename = Some(filename.into());
        self
    }

    /// Configured database filename, or [`DEFAULT_DATABASE_FILENAME`].
    pub fn database_filename(&self) -> &str {
        or_default(self.database_filename.as_deref(), DEFAULT_DATABASE_FILENAME)
    }

    /// Configured export filename, or [`DEFAULT_EXPORT_FILENAME`].
    pub fn export_filename(&self) -> &str {
        or_default(self.export_filename.as_deref(), DEFAULT_EXPORT_FILENAME)
    }
}

/// Returns `value` trimmed, or `default` when it is absent or blank.
pub fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DatabaseConfig, DATABASE_FILENAME_ENV, DEFAULT_DATABASE_FILENAME,
        DEFAULT_EXPORT_FILENAME, EXPORT_FILENAME_ENV,
    };

    #[test]
    fn unset_config_uses_defaults() {
        let config = DatabaseConfig::new();
        assert_eq!(config.database_filename(), DEFAULT_DATABASE_FILENAME);
        assert_eq!(config.export_filename(), DEFAULT_EXPORT_FILENAME);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = DatabaseConfig::new()
            .with_database_filename("   ")
            .with_export_filename("");
        assert_eq!(config.database_filename(), DEFAULT_DATABASE_FILENAME);
        assert_eq!(config.export_filename(), DEFAULT_EXPORT_FILENAME);
    }

    #[test]
    fn configured_values_are_trimmed() {
        let config = DatabaseConfig::new()
            .with_database_filename(" SQLiteSample.db3 ")
            .with_export_filename("Backup");
        assert_eq!(config.database_filename(), "SQLiteSample.db3");
        assert_eq!(config.export_filename(), "Backup");
    }

    #[test]
    fn from_env_reads_overrides() {
        std::env::set_var(DATABASE_FILENAME_ENV, "env.db3");
        std::env::remove_var(EXPORT_FILENAME_ENV);

        let config = DatabaseConfig::from_env();
        assert_eq!(config.database_filename(), "env.db3");
        assert_eq!(config.export_filename(), DEFAULT_EXPORT_FILENAME);

        std::env::remove_var(DATABASE_FILENAME_ENV);
    }
}
