// Config loading and validation tests

use evelina_status::config::AppConfig;
use evelina_status::models::TimeRange;
use std::time::Duration;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[api]
base_url = "https://evelina.example/api"
request_timeout_ms = 10000
max_attempts = 3
retry_delay_ms = 1000

[status]
cache_ttl_secs = 60
default_range = "7d"

[monitoring]
stats_log_interval_secs = 60
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.api.base_url, "https://evelina.example/api");
    assert_eq!(config.status.default_range, TimeRange::Last7Days);
    assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    assert_eq!(config.monitoring.stats_log_interval_secs, 60);
}

#[test]
fn test_config_defaults_when_sections_omitted() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("minimal");
    assert_eq!(config.api.base_url, "http://127.0.0.1:3000/api");
    assert_eq!(config.api.request_timeout_ms, 10_000);
    assert_eq!(config.api.max_attempts, 3);
    assert_eq!(config.api.retry_delay_ms, 1000);
    assert!(config.api.retry_on_timeout);
    assert_eq!(config.status.cache_ttl_secs, 60);
    assert_eq!(config.status.default_range, TimeRange::Last24Hours);
}

#[test]
fn test_api_settings_carry_retry_policy() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("valid");
    let settings = config.api.settings();
    assert_eq!(settings.request_timeout, Duration::from_secs(10));
    assert_eq!(settings.retry.max_attempts, 3);
    assert_eq!(settings.retry.initial_delay, Duration::from_secs(1));
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_host() {
    let bad = VALID_CONFIG.replace("host = \"0.0.0.0\"", "host = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.host"));
}

#[test]
fn test_config_validation_rejects_non_http_base_url() {
    let bad = VALID_CONFIG.replace("https://evelina.example/api", "evelina.example/api");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("api.base_url"));
}

#[test]
fn test_config_validation_rejects_request_timeout_zero() {
    let bad = VALID_CONFIG.replace("request_timeout_ms = 10000", "request_timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("request_timeout_ms"));
}

#[test]
fn test_config_validation_rejects_max_attempts_zero() {
    let bad = VALID_CONFIG.replace("max_attempts = 3", "max_attempts = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_attempts"));
}

#[test]
fn test_config_validation_rejects_cache_ttl_zero() {
    let bad = VALID_CONFIG.replace("cache_ttl_secs = 60", "cache_ttl_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("cache_ttl_secs"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "stats_log_interval_secs = 60",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_rejects_unknown_range() {
    let bad = VALID_CONFIG.replace("default_range = \"7d\"", "default_range = \"1y\"");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.status.default_range, TimeRange::Last7Days);
}
