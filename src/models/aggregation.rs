// Chart-ready series: one point per hour or day bucket, keyed by range selector.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One bucketed output point; timestamp sits on the bucket boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPoint {
    pub timestamp: DateTime<Utc>,
    pub total_servers: u64,
    pub total_users: u64,
    pub average_latency_ms: u64,
}

/// Bucket width used for a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Hour,
    Day,
}

impl Granularity {
    pub fn width(self) -> TimeDelta {
        match self {
            Granularity::Hour => TimeDelta::hours(1),
            Granularity::Day => TimeDelta::days(1),
        }
    }
}

/// User-selected time window; serializes as "24h", "7d", "30d", "all".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Last24Hours,
        TimeRange::Last7Days,
        TimeRange::Last30Days,
        TimeRange::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
            TimeRange::All => "all",
        }
    }

    /// 24h charts per hour; everything else per day.
    pub fn granularity(self) -> Granularity {
        match self {
            TimeRange::Last24Hours => Granularity::Hour,
            _ => Granularity::Day,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "24h" => Ok(TimeRange::Last24Hours),
            "7d" => Ok(TimeRange::Last7Days),
            "30d" => Ok(TimeRange::Last30Days),
            "all" => Ok(TimeRange::All),
            other => Err(format!(
                "unknown time range {other:?}, expected one of 24h, 7d, 30d, all"
            )),
        }
    }
}

/// Growth over the displayed series (last point minus first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodChange {
    pub servers: i64,
    pub users: i64,
}

impl PeriodChange {
    /// None when fewer than two points are available.
    pub fn over(points: &[AggregatedPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let first = points.first()?;
        let last = points.last()?;
        Some(Self {
            servers: signed_delta(first.total_servers, last.total_servers),
            users: signed_delta(first.total_users, last.total_users),
        })
    }
}

/// `to - from`, clamped to the i64 range.
fn signed_delta(from: u64, to: u64) -> i64 {
    let delta = i128::from(to) - i128::from(from);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}
