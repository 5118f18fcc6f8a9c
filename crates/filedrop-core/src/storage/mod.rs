//! Handle to the embedded SQLite datastore.
//!
//! The receiver never writes notifications here. The pool exists so the
//! service owns the datastore declared by [`DatabaseConfig`] and can report
//! its health through the probes.

use std::time::Duration;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::debug;

use crate::{
    database::DatabaseConfig,
    error::{CoreError, Result},
};

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum open connections.
    pub max_connections: u32,
    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self { max_connections: 5, acquire_timeout: Duration::from_secs(10) }
    }
}

/// Shared datastore access.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Opens the datastore, creating its directory and file when missing.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Io` if the data directory cannot be created and
    /// `CoreError::Database` if SQLite refuses the connection.
    pub async fn connect(config: &DatabaseConfig, settings: &PoolSettings) -> Result<Self> {
        if let Some(dir) = config.path().parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| CoreError::Io { path: dir.to_path_buf(), source })?;
        }

        debug!(engine = %config.engine(), path = %config.path().display(), "Opening datastore");

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(config.connect_options())
            .await?;

        Ok(Self { pool })
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Verifies the datastore answers a trivial query.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the pool is closed or the query fails.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Closes every connection. Subsequent health checks fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
