//! Configuration loading tests.

use std::io::Write;
use std::time::Duration;

use mi8_core::config::{Config, StorageKind};
use mi8_core::error::ErrorCode;
use mi8_core::telemetry::LogFormat;

fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("mi8-config-")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_toml_file() {
    let file = write_config(
        ".toml",
        r#"
[server]
port = 9090

[storage]
backend = "redis"
seed_demo_data = true

[redis]
url = "redis://cache:6379/2"
key_prefix = "test:"
command_timeout = "750ms"

[logging]
format = "compact"

[metrics]
enabled = false
"#,
    );

    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.storage.backend, StorageKind::Redis);
    assert!(config.storage.seed_demo_data);
    assert_eq!(config.redis.url, "redis://cache:6379/2");
    assert_eq!(config.redis.key_prefix, "test:");
    assert_eq!(config.redis.command_timeout, Duration::from_millis(750));
    assert_eq!(config.redis.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert!(!config.metrics.enabled);
}

#[test]
fn test_load_yaml_file_with_defaults() {
    let file = write_config(
        ".yaml",
        "storage:\n  backend: memory\n",
    );

    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.storage.backend, StorageKind::Memory);
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.redis.command_timeout, Duration::from_secs(2));
}

#[test]
fn test_invalid_file_settings_are_rejected() {
    let file = write_config(
        ".toml",
        r#"
[redis]
command_timeout = "0s"
"#,
    );

    let err = Config::from_file(file.path().to_str().unwrap()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidConfiguration);
}

#[test]
fn test_unknown_backend_is_a_configuration_error() {
    let file = write_config(
        ".toml",
        r#"
[storage]
backend = "postgres"
"#,
    );

    let err = Config::from_file(file.path().to_str().unwrap()).unwrap_err();
    assert_eq!(err.code().category(), "configuration");
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    let err = Config::from_file("/nonexistent/mi8-config.toml").unwrap_err();
    assert_eq!(err.code().category(), "configuration");
}

#[test]
fn test_resolve_rejects_invalid_redis_file_instead_of_defaulting() {
    let file = write_config(
        ".toml",
        r#"
[storage]
backend = "redis"

[redis]
command_timeout = "0s"
"#,
    );

    let err = Config::resolve(Some(file.path().to_str().unwrap())).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidConfiguration);
}

#[test]
fn test_resolve_keeps_file_backend() {
    let file = write_config(
        ".toml",
        r#"
[storage]
backend = "redis"
"#,
    );

    let config = Config::resolve(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.storage.backend, StorageKind::Redis);
}

#[test]
fn test_resolve_missing_file_is_an_error() {
    let err = Config::resolve(Some("/nonexistent/mi8-server.toml")).unwrap_err();
    assert_eq!(err.code().category(), "configuration");
}
