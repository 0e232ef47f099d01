// Shared test helpers: sample builders and an in-memory StatusApi

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use evelina_status::api_client::StatusApi;
use evelina_status::error::FetchError;
use evelina_status::models::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn sample_at(
    timestamp: DateTime<Utc>,
    guilds: u64,
    users: u64,
    ping: f64,
) -> RawHistorySample {
    RawHistorySample {
        timestamp,
        guild_count: guilds,
        user_count: users,
        ping_ms: ping,
    }
}

pub fn sample(timestamp: &str, guilds: u64, users: u64, ping: f64) -> RawHistorySample {
    sample_at(ts(timestamp), guilds, users, ping)
}

pub fn shard(shard_id: u32, latency: f64, servers: u64, members: u64) -> ShardSnapshot {
    ShardSnapshot {
        shard_id,
        is_ready: true,
        server_count: servers,
        member_count: members,
        latency_ms: latency,
        uptime_seconds: 3600.0,
    }
}

/// Serves canned results; counts calls; optionally delays each call.
pub struct MockApi {
    history: Mutex<Result<Vec<RawHistorySample>, FetchError>>,
    shards: Mutex<Result<Vec<ShardSnapshot>, FetchError>>,
    delay: Mutex<Duration>,
    pub history_calls: AtomicUsize,
    pub shard_calls: AtomicUsize,
}

impl MockApi {
    pub fn new(history: Vec<RawHistorySample>, shards: Vec<ShardSnapshot>) -> Self {
        Self {
            history: Mutex::new(Ok(history)),
            shards: Mutex::new(Ok(shards)),
            delay: Mutex::new(Duration::ZERO),
            history_calls: AtomicUsize::new(0),
            shard_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_history(&self, result: Result<Vec<RawHistorySample>, FetchError>) {
        *self.history.lock().unwrap() = result;
    }

    pub fn set_shards(&self, result: Result<Vec<ShardSnapshot>, FetchError>) {
        *self.shards.lock().unwrap() = result;
    }

    /// Applies to calls started after this point.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst) + self.shard_calls.load(Ordering::SeqCst)
    }
}

impl StatusApi for MockApi {
    async fn history(&self) -> Result<Vec<RawHistorySample>, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        let result = self.history.lock().unwrap().clone();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn shards(&self) -> Result<Vec<ShardSnapshot>, FetchError> {
        self.shard_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        let result = self.shards.lock().unwrap().clone();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
