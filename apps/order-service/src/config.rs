//! Order service configuration.
//!
//! Layered with the `config` crate, later sources win:
//!
//! ```text
//! built-in defaults ──► stockline.toml (optional) ──► STOCKLINE_* env vars
//! ```
//!
//! `STOCKLINE_BIND_ADDR=0.0.0.0:9000` overrides `bind_addr`, and so on.

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use stockline_db::DbConfig;

use crate::engine::EngineSettings;

/// Secret used when none is configured. Refused outside development.
pub const DEV_JWT_SECRET: &str = "stockline-dev-secret-change-in-production";

/// Order service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listen address
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// How long a writer waits for SQLite's write lock, in milliseconds
    pub busy_timeout_ms: u64,

    /// HMAC secret for validating bearer tokens
    pub jwt_secret: String,

    /// Lifetime of tokens minted by [`crate::auth::JwtManager::issue_token`]
    pub jwt_lifetime_secs: i64,

    /// Upper bound on one store call (one placement transaction, one status
    /// update), in milliseconds
    pub store_timeout_ms: u64,

    /// Attempts per operation when the store reports a write conflict
    pub conflict_max_attempts: u32,

    /// Base delay between conflict retries, in milliseconds; grows linearly
    pub retry_backoff_ms: u64,

    /// Development mode allows the built-in JWT secret
    pub dev_mode: bool,
}

impl ServiceConfig {
    /// Builder pre-loaded with the defaults.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("database_path", "./stockline.db")?
            .set_default("max_connections", 8)?
            .set_default("busy_timeout_ms", 2_000)?
            .set_default("jwt_secret", DEV_JWT_SECRET)?
            .set_default("jwt_lifetime_secs", 8 * 3600)?
            .set_default("store_timeout_ms", 10_000)?
            .set_default("conflict_max_attempts", 5)?
            .set_default("retry_backoff_ms", 25)?
            .set_default("dev_mode", false)?)
    }

    /// Loads defaults, then `stockline.toml` if present, then the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("stockline").required(false))
            .add_source(Environment::with_prefix("STOCKLINE").try_parsing(true));

        Self::from_builder(builder)
    }

    /// Builds and validates a configuration from any builder.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ServiceConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }

        if self.jwt_secret == DEV_JWT_SECRET && !self.dev_mode {
            return Err(ConfigError::InsecureSecret);
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }

        if self.store_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("store_timeout_ms".to_string()));
        }

        if self.conflict_max_attempts == 0 {
            return Err(ConfigError::InvalidValue("conflict_max_attempts".to_string()));
        }

        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            max_attempts: self.conflict_max_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("jwt_secret is the development default; set STOCKLINE_JWT_SECRET or enable dev_mode")]
    InsecureSecret,
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<ServiceConfig, ConfigError> {
        ServiceConfig::from_builder(
            ServiceConfig::defaults()
                .unwrap()
                .add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults_in_dev_mode() {
        let config = from_toml("dev_mode = true").unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.conflict_max_attempts, 5);
        assert_eq!(config.engine_settings().store_timeout, Duration::from_secs(10));
        assert_eq!(config.db_config().busy_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = from_toml(
            r#"
            jwt_secret = "prod-secret"
            database_path = "/var/lib/stockline/stockline.db"
            conflict_max_attempts = 3
            retry_backoff_ms = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/stockline/stockline.db"));
        assert_eq!(config.engine_settings().max_attempts, 3);
        assert_eq!(config.engine_settings().backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_dev_secret_rejected_outside_dev_mode() {
        assert!(matches!(from_toml(""), Err(ConfigError::InsecureSecret)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            from_toml("dev_mode = true\nconflict_max_attempts = 0"),
            Err(ConfigError::InvalidValue(field)) if field == "conflict_max_attempts"
        ));
        assert!(matches!(
            from_toml("dev_mode = true\nstore_timeout_ms = 0"),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
