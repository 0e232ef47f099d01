use std::time::Duration;

use serde::Deserialize;

use crate::api_client::{
    ApiSettings, DEFAULT_API_BASE_URL, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT, RetryPolicy,
};
use crate::models::TimeRange;
use crate::status_repo::DEFAULT_FRESHNESS;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Upstream telemetry API (history + shards).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// When false a timed-out request is reported at once instead of being retried.
    #[serde(default = "default_true")]
    pub retry_on_timeout: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY.as_millis() as u64
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_on_timeout: true,
        }
    }
}

impl ApiConfig {
    pub fn settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_delay: Duration::from_millis(self.retry_delay_ms),
                retry_on_timeout: self.retry_on_timeout,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    /// Cache freshness window; also the background refresh interval.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub default_range: TimeRange,
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_FRESHNESS.as_secs()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            default_range: TimeRange::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (refresh counters) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"),
            "api.base_url must be an http(s) URL, got {:?}",
            self.api.base_url
        );
        anyhow::ensure!(
            self.api.request_timeout_ms > 0,
            "api.request_timeout_ms must be > 0, got {}",
            self.api.request_timeout_ms
        );
        anyhow::ensure!(
            self.api.max_attempts > 0,
            "api.max_attempts must be > 0, got {}",
            self.api.max_attempts
        );
        anyhow::ensure!(
            self.status.cache_ttl_secs > 0,
            "status.cache_ttl_secs must be > 0, got {}",
            self.status.cache_ttl_secs
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.status.cache_ttl_secs)
    }
}
