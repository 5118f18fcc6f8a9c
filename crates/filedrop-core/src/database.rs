//! Declaration of the embedded, file-based datastore.
//!
//! The datastore lives next to the application tree rather than inside it:
//! `<base_dir>/../data/private/db.sqlite3`. The value is built once when
//! configuration loads and only read afterwards.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnectOptions;

/// Directory segments between the base directory and the database file.
const DATA_SEGMENTS: [&str; 3] = ["..", "data", "private"];

/// File name of the SQLite database.
const DATABASE_FILE: &str = "db.sqlite3";

/// Storage backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseEngine {
    /// Embedded SQLite 3 database file.
    #[serde(rename = "sqlite3")]
    Sqlite,
}

impl DatabaseEngine {
    /// Returns the engine identifier string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite3",
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection descriptor for the default datastore.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// use filedrop_core::{DatabaseConfig, DatabaseEngine};
///
/// let config = DatabaseConfig::from_base_dir("/srv/app");
/// assert_eq!(config.engine(), DatabaseEngine::Sqlite);
/// assert_eq!(config.path(), Path::new("/srv/app/../data/private/db.sqlite3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    engine: DatabaseEngine,
    path: PathBuf,
}

impl DatabaseConfig {
    /// Derives the datastore location from the application base directory.
    ///
    /// The `..` segment is kept verbatim; the path is not canonicalized.
    pub fn from_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let mut path = base_dir.as_ref().to_path_buf();
        path.extend(DATA_SEGMENTS);
        path.push(DATABASE_FILE);

        Self { engine: DatabaseEngine::Sqlite, path }
    }

    /// Backend identifier.
    pub const fn engine(&self) -> DatabaseEngine {
        self.engine
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds sqlx connection options without touching the filesystem.
    pub fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new().filename(&self.path).create_if_missing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_derived_from_base_dir() {
        let config = DatabaseConfig::from_base_dir("/srv/app");

        assert_eq!(config.path(), Path::new("/srv/app/../data/private/db.sqlite3"));
        assert_eq!(config.engine(), DatabaseEngine::Sqlite);
    }

    #[test]
    fn relative_base_dir_stays_relative() {
        let config = DatabaseConfig::from_base_dir(".");

        assert!(config.path().is_relative());
        assert!(config.path().ends_with("data/private/db.sqlite3"));
    }

    #[test]
    fn engine_serializes_as_identifier() {
        let json = serde_json::to_value(DatabaseConfig::from_base_dir("/app")).unwrap();

        assert_eq!(json["engine"], "sqlite3");
        assert_eq!(json["path"], "/app/../data/private/db.sqlite3");
        assert_eq!(DatabaseEngine::Sqlite.to_string(), "sqlite3");
    }

    #[test]
    fn connect_options_point_at_database_file() {
        let config = DatabaseConfig::from_base_dir("/srv/app");
        let options = config.connect_options();

        assert_eq!(options.get_filename(), config.path());
    }
}
