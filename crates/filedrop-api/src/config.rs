//! Configuration management for the filedrop service.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use filedrop_core::{DatabaseConfig, PoolSettings};
use serde::{Deserialize, Serialize};

use crate::RouteOptions;

const CONFIG_FILE: &str = "filedrop.toml";

/// Paths owned by the probes; the receiver may not reuse them.
const RESERVED_PATHS: [&str; 3] = ["/health", "/ready", "/live"];

/// Service configuration with defaults, file, and environment overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`filedrop.toml`)
/// 3. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Database
    /// Application base directory. The datastore lives at
    /// `<base_dir>/../data/private/db.sqlite3`.
    ///
    /// Environment variable: `BASE_DIR`
    #[serde(default = "default_base_dir", alias = "BASE_DIR")]
    pub base_dir: PathBuf,
    /// Maximum number of datastore connections.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[serde(default = "default_max_connections", alias = "DATABASE_MAX_CONNECTIONS")]
    pub database_max_connections: u32,
    /// Connection acquire timeout in seconds.
    ///
    /// Environment variable: `DATABASE_CONNECTION_TIMEOUT`
    #[serde(default = "default_acquire_timeout", alias = "DATABASE_CONNECTION_TIMEOUT")]
    pub database_connection_timeout: u64,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Receiver
    /// Route the Eventarc trigger posts to.
    ///
    /// Environment variable: `EVENTARC_PATH`
    #[serde(default = "default_eventarc_path", alias = "EVENTARC_PATH")]
    pub eventarc_path: String,
    /// Largest notification body read, in bytes.
    ///
    /// Environment variable: `MAX_BODY_BYTES`
    #[serde(default = "default_max_body_bytes", alias = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // Logging
    /// Log filter directive.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, `filedrop.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(Figment::new().merge(Toml::file(CONFIG_FILE)))
    }

    /// Loads configuration from an explicit TOML file plus the environment.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_figment(Figment::new().merge(Toml::file(path.into())))
    }

    fn from_figment(file: Figment) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Datastore declaration derived from `base_dir`.
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::from_base_dir(&self.base_dir)
    }

    /// Connection pool sizing.
    pub fn to_pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database_max_connections,
            acquire_timeout: Duration::from_secs(self.database_connection_timeout),
        }
    }

    /// Router settings.
    pub fn to_route_options(&self) -> RouteOptions {
        RouteOptions {
            eventarc_path: self.eventarc_path.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout: Duration::from_secs(self.request_timeout),
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database_max_connections must be greater than 0");
        }

        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }

        if !self.eventarc_path.starts_with('/') {
            anyhow::bail!("eventarc_path must start with '/'");
        }

        if RESERVED_PATHS.contains(&self.eventarc_path.as_str()) {
            anyhow::bail!("eventarc_path {} is reserved for health probes", self.eventarc_path);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            database_max_connections: default_max_connections(),
            database_connection_timeout: default_acquire_timeout(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            eventarc_path: default_eventarc_path(),
            max_body_bytes: default_max_body_bytes(),
            rust_log: default_log_level(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_eventarc_path() -> String {
    "/eventarc".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, path::Path, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Variables read by `Config`; cleared so the host environment cannot
    /// leak into assertions.
    const CONFIG_VARS: [&str; 9] = [
        "BASE_DIR",
        "DATABASE_MAX_CONNECTIONS",
        "DATABASE_CONNECTION_TIMEOUT",
        "HOST",
        "PORT",
        "REQUEST_TIMEOUT",
        "EVENTARC_PATH",
        "MAX_BODY_BYTES",
        "RUST_LOG",
    ];

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut guard = Self { _lock: lock, originals: HashMap::new() };
            for var in CONFIG_VARS {
                guard.remember(var);
                env::remove_var(var);
            }
            guard
        }

        fn remember(&mut self, key: &str) {
            self.originals.entry(key.to_string()).or_insert_with(|| env::var(key).ok());
        }

        fn set_var(&mut self, key: &str, value: &str) {
            self.remember(key);
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for (var, original) in &self.originals {
                match original {
                    Some(value) => env::set_var(var, value),
                    None => env::remove_var(var),
                }
            }
        }
    }

    #[test]
    fn default_config_snapshot() {
        let config = Config::default();

        assert!(config.validate().is_ok());

        insta::assert_json_snapshot!("default_config", config);
    }

    #[test]
    fn env_overrides_defaults() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("BASE_DIR", "/srv/filedrop/app");
        guard.set_var("DATABASE_MAX_CONNECTIONS", "12");
        guard.set_var("PORT", "9090");
        guard.set_var("EVENTARC_PATH", "/hooks/storage");
        guard.set_var("MAX_BODY_BYTES", "4096");

        let config = Config::load().expect("Config should load with env overrides");

        assert_eq!(config.base_dir, PathBuf::from("/srv/filedrop/app"));
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.port, 9090);
        assert_eq!(config.eventarc_path, "/hooks/storage");
        assert_eq!(config.max_body_bytes, 4096);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn toml_file_is_layered_under_env() {
        let mut guard = TestEnvGuard::new();
        let dir = tempfile::tempdir().expect("create temp dir");
        let file = dir.path().join("filedrop.toml");
        std::fs::write(&file, "port = 7000\nrequest_timeout = 5\nbase_dir = \"/from/file\"\n")
            .expect("write config file");
        guard.set_var("PORT", "7001");

        let config = Config::load_from(&file).expect("Config should load from file");

        assert_eq!(config.port, 7001, "environment wins over file");
        assert_eq!(config.request_timeout, 5, "file wins over defaults");
        assert_eq!(config.base_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn database_is_derived_from_base_dir() {
        let config = Config { base_dir: PathBuf::from("/srv/app"), ..Config::default() };

        let database = config.database();

        assert_eq!(database.path(), Path::new("/srv/app/../data/private/db.sqlite3"));
        assert_eq!(database.engine().as_str(), "sqlite3");
    }

    #[test]
    fn conversions_carry_values() {
        let config = Config {
            database_max_connections: 3,
            database_connection_timeout: 7,
            request_timeout: 11,
            eventarc_path: "/in".to_string(),
            max_body_bytes: 2048,
            ..Config::default()
        };

        let pool = config.to_pool_settings();
        assert_eq!(pool.max_connections, 3);
        assert_eq!(pool.acquire_timeout, Duration::from_secs(7));

        let routes = config.to_route_options();
        assert_eq!(routes.eventarc_path, "/in");
        assert_eq!(routes.max_body_bytes, 2048);
        assert_eq!(routes.request_timeout, Duration::from_secs(11));
    }

    #[test]
    fn invalid_config_validation_fails() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.database_max_connections = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.max_body_bytes = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.eventarc_path = "eventarc".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.eventarc_path = "/health".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_address_parsing() {
        let config = Config { host: "0.0.0.0".to_string(), port: 9000, ..Config::default() };

        let addr = config.parse_server_addr().expect("Should parse socket address");

        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 9000);
    }
}
