// Telemetry API client: GET with timeout, classified errors, retry with backoff.

mod retry;

pub use retry::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, RetryPolicy, retry_with_backoff};

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::error::FetchError;
use crate::models::{RawHistorySample, ShardSnapshot};
use crate::version::{NAME, VERSION};

/// Telemetry API base used when the config does not override it.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const HISTORY_ENDPOINT: &str = "/history";
pub const SHARDS_ENDPOINT: &str = "/shards";

/// Longest error body kept in an `Http` error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Source of history samples and live shard snapshots.
pub trait StatusApi: Send + Sync {
    fn history(&self) -> impl Future<Output = Result<Vec<RawHistorySample>, FetchError>> + Send;
    fn shards(&self) -> impl Future<Output = Result<Vec<ShardSnapshot>, FetchError>> + Send;
}

impl<A: StatusApi> StatusApi for Arc<A> {
    fn history(&self) -> impl Future<Output = Result<Vec<RawHistorySample>, FetchError>> + Send {
        (**self).history()
    }

    fn shards(&self) -> impl Future<Output = Result<Vec<ShardSnapshot>, FetchError>> + Send {
        (**self).shards()
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("{NAME}/{VERSION}"))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            request_timeout: settings.request_timeout,
            retry: settings.retry,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` under the retry policy and return the parsed JSON body.
    #[instrument(skip(self), fields(operation = "fetch_json"))]
    pub async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        retry_with_backoff(&self.retry, path, || self.fetch_once(path)).await
    }

    /// Like `fetch_json`, then requires a JSON array of `T`. Shape errors are not retried.
    pub async fn fetch_array<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, FetchError> {
        let value = self.fetch_json(path).await?;
        decode_array(path, value)
    }

    async fn fetch_once(&self, path: &str) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(self.url(path))
            .header(ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.contains("application/json") {
            return Err(FetchError::Format(format!(
                "expected JSON, got content type {content_type:?}"
            )));
        }

        resp.json::<Value>().await.map_err(classify)
    }
}

impl StatusApi for ApiClient {
    async fn history(&self) -> Result<Vec<RawHistorySample>, FetchError> {
        self.fetch_array(HISTORY_ENDPOINT).await
    }

    async fn shards(&self) -> Result<Vec<ShardSnapshot>, FetchError> {
        let shards: Vec<ShardSnapshot> = self.fetch_array(SHARDS_ENDPOINT).await?;
        ensure_unique_shard_ids(&shards)?;
        Ok(shards)
    }
}

/// Requires `value` to be a JSON array whose elements deserialize as `T`.
pub fn decode_array<T: DeserializeOwned>(what: &str, value: Value) -> Result<Vec<T>, FetchError> {
    if !value.is_array() {
        return Err(FetchError::Format(format!(
            "{what}: expected array, got {}",
            json_kind(&value)
        )));
    }
    serde_json::from_value(value).map_err(|e| FetchError::Format(format!("{what}: {e}")))
}

pub fn ensure_unique_shard_ids(shards: &[ShardSnapshot]) -> Result<(), FetchError> {
    let mut seen = HashSet::with_capacity(shards.len());
    for shard in shards {
        if !seen.insert(shard.shard_id) {
            return Err(FetchError::Format(format!(
                "duplicate shard id {}",
                shard.shard_id
            )));
        }
    }
    Ok(())
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Format(format!("body is not valid JSON: {}", source_chain(&e)))
    } else {
        FetchError::Transport(source_chain(&e))
    }
}

/// Error message followed by its sources, joined with ": ".
fn source_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
