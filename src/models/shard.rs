// Live shard snapshots (GET /shards) and the shard panel derived from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bot shard's current state. Field names follow the telemetry API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardSnapshot {
    pub shard_id: u32,
    pub is_ready: bool,
    pub server_count: u64,
    pub member_count: u64,
    #[serde(rename = "latency")]
    pub latency_ms: f64,
    #[serde(rename = "uptime")]
    pub uptime_seconds: f64,
}

/// Totals across all shards of one snapshot set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardSummary {
    pub shard_count: usize,
    pub ready_shards: usize,
    pub total_servers: u64,
    pub total_users: u64,
    pub average_latency_ms: u64,
    pub all_operational: bool,
    pub status_line: String,
}

impl ShardSummary {
    /// Returns None for an empty snapshot set (no mean latency to report).
    pub fn from_shards(shards: &[ShardSnapshot]) -> Option<Self> {
        if shards.is_empty() {
            return None;
        }
        let shard_count = shards.len();
        let ready_shards = shards.iter().filter(|s| s.is_ready).count();
        let total_servers = shards
            .iter()
            .map(|s| s.server_count)
            .fold(0, u64::saturating_add);
        let total_users = shards
            .iter()
            .map(|s| s.member_count)
            .fold(0, u64::saturating_add);
        let latency_sum: f64 = shards.iter().map(|s| s.latency_ms).sum();
        let average_latency_ms = (latency_sum / shard_count as f64).round() as u64;
        let all_operational = ready_shards == shard_count;
        let status_line = if all_operational {
            "All Systems Operational".to_string()
        } else {
            format!("{ready_shards}/{shard_count} Shards Operational")
        };
        Some(Self {
            shard_count,
            ready_shards,
            total_servers,
            total_users,
            average_latency_ms,
            all_operational,
            status_line,
        })
    }
}

/// One shard as shown in the shard grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardRow {
    pub shard_id: u32,
    pub is_ready: bool,
    pub server_count: u64,
    pub member_count: u64,
    pub latency_ms: u64,
    pub uptime: String,
}

impl From<&ShardSnapshot> for ShardRow {
    fn from(s: &ShardSnapshot) -> Self {
        Self {
            shard_id: s.shard_id,
            is_ready: s.is_ready,
            server_count: s.server_count,
            member_count: s.member_count,
            latency_ms: s.latency_ms.round() as u64,
            uptime: format_uptime(s.uptime_seconds),
        }
    }
}

/// Shard panel served by GET /api/shards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardPanel {
    pub loading: bool,
    pub error: Option<String>,
    pub summary: Option<ShardSummary>,
    pub shards: Vec<ShardRow>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Formats uptime as "Xh Ym", or "Ym" under one hour. Zero, negative and NaN give "0h 0m".
pub fn format_uptime(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "0h 0m".to_string();
    }
    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}
