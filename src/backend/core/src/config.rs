//! Configuration management.

use serde::Deserialize;
use std::time::Duration;

use crate::error::{ErrorCode, Mi8Error, Result};
use crate::telemetry::{LoggingConfig, MetricsConfig};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which backing store variant to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,

    /// Ingest the sample events at startup
    #[serde(default)]
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Prefix for every key this service writes
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Upper bound for a single Redis round trip
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            connect_timeout: default_connect_timeout(),
            command_timeout: default_command_timeout(),
        }
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_redis_url() -> String { "redis://127.0.0.1:6379".to_string() }
fn default_key_prefix() -> String { "mi8:".to_string() }
fn default_connect_timeout() -> Duration { Duration::from_secs(5) }
fn default_command_timeout() -> Duration { Duration::from_secs(2) }

impl Config {
    /// Load configuration from the environment (`MI8__SECTION__KEY`).
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MI8").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with the environment layered on top.
    pub fn from_file(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("MI8").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Startup configuration: the given file with the environment on top, or
    /// the environment alone. Load and validation errors are returned, never
    /// replaced by defaults.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port must be non-zero"));
        }
        if self.redis.command_timeout.is_zero() {
            return Err(invalid("redis.command_timeout must be greater than zero"));
        }
        if self.storage.backend == StorageKind::Redis && self.redis.url.trim().is_empty() {
            return Err(invalid("redis.url is required for the redis backend"));
        }
        Ok(())
    }
}

fn invalid(message: &'static str) -> Mi8Error {
    Mi8Error::new(ErrorCode::InvalidConfiguration, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageKind::Memory);
        assert!(!config.storage.seed_demo_data);
        assert_eq!(config.redis.key_prefix, "mi8:");
        assert_eq!(config.redis.command_timeout, Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.redis.command_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_validate_requires_redis_url_for_redis_backend() {
        let mut config = Config::default();
        config.storage.backend = StorageKind::Redis;
        config.redis.url = " ".to_string();
        assert!(config.validate().is_err());

        config.storage.backend = StorageKind::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_humantime() {
        let raw = serde_json::json!({
            "storage": { "backend": "redis" },
            "redis": { "command_timeout": "250ms", "connect_timeout": "1s" }
        });
        let config: Config = serde_json::from_value(raw).unwrap();
        assert_eq!(config.storage.backend, StorageKind::Redis);
        assert_eq!(config.redis.command_timeout, Duration::from_millis(250));
        assert_eq!(config.redis.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
    }
}
