//! Error types for datastore and configuration failures.
//!
//! The receiver itself has no failure path; these errors only surface at
//! startup and from the health probes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for internal operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Filesystem preparation for the datastore failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that could not be prepared
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                Self::Database("timed out acquiring a datastore connection".to_string())
            },
            sqlx::Error::PoolClosed => Self::Database("datastore pool is closed".to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}
