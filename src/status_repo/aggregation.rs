// Bucketing: history samples + live shards -> one ordered point per hour/day bucket.
// Pure functions; the caller supplies "now".

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::FetchError;
use crate::models::{AggregatedPoint, Granularity, RawHistorySample, ShardSnapshot, TimeRange};

/// Truncates `ts` down to the start of its hour or UTC day.
pub fn truncate_to_bucket(ts: DateTime<Utc>, granularity: Granularity) -> DateTime<Utc> {
    let width = granularity.width().num_seconds();
    let into_bucket = TimeDelta::seconds(ts.timestamp().rem_euclid(width))
        + TimeDelta::nanoseconds(i64::from(ts.timestamp_subsec_nanos()));
    ts - into_bucket
}

/// Requested window start; None for `all`, which starts at the earliest sample.
pub fn window_start(range: TimeRange, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match range {
        TimeRange::Last24Hours => Some(now - TimeDelta::hours(24)),
        TimeRange::Last7Days => Some(truncate_to_bucket(
            now - TimeDelta::days(7),
            Granularity::Day,
        )),
        TimeRange::Last30Days => Some(truncate_to_bucket(
            now - TimeDelta::days(30),
            Granularity::Day,
        )),
        TimeRange::All => None,
    }
}

/// Later of the requested window start and the earliest real sample.
pub fn effective_start(
    range: TimeRange,
    earliest_sample: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match window_start(range, now) {
        Some(start) => start.max(earliest_sample),
        None => earliest_sample,
    }
}

/// Mean shard latency rounded to the nearest millisecond; None for no shards.
pub fn current_latency(shards: &[ShardSnapshot]) -> Option<u64> {
    if shards.is_empty() {
        return None;
    }
    let sum: f64 = shards.iter().map(|s| s.latency_ms).sum();
    Some((sum / shards.len() as f64).round() as u64)
}

/// First sample (in time order) of each bucket inside `[start, now]`.
pub fn bucket_history(
    history: &[RawHistorySample],
    granularity: Granularity,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BTreeMap<DateTime<Utc>, AggregatedPoint> {
    let mut sorted: Vec<&RawHistorySample> = history.iter().collect();
    // stable: equal timestamps keep response order
    sorted.sort_by_key(|s| s.timestamp);

    let mut buckets = BTreeMap::new();
    for sample in sorted {
        if sample.timestamp < start || sample.timestamp > now {
            continue;
        }
        let key = truncate_to_bucket(sample.timestamp, granularity);
        buckets.entry(key).or_insert_with(|| AggregatedPoint {
            timestamp: key,
            total_servers: sample.guild_count,
            total_users: sample.user_count,
            average_latency_ms: sample.ping_ms.round() as u64,
        });
    }
    buckets
}

/// Builds the chart series for `range`. Fails with `EmptyData` if either input is empty.
pub fn aggregate(
    history: &[RawHistorySample],
    shards: &[ShardSnapshot],
    range: TimeRange,
    now: DateTime<Utc>,
) -> Result<Vec<AggregatedPoint>, FetchError> {
    let Some(earliest) = history.iter().map(|s| s.timestamp).min() else {
        return Err(FetchError::EmptyData("history"));
    };
    let Some(latency) = current_latency(shards) else {
        return Err(FetchError::EmptyData("shard"));
    };

    let granularity = range.granularity();
    let start = effective_start(range, earliest, now);
    let mut buckets = bucket_history(history, granularity, start, now);

    let now_key = truncate_to_bucket(now, granularity);
    buckets.entry(now_key).or_insert_with(|| AggregatedPoint {
        timestamp: now_key,
        total_servers: shards
            .iter()
            .map(|s| s.server_count)
            .fold(0, u64::saturating_add),
        total_users: shards
            .iter()
            .map(|s| s.member_count)
            .fold(0, u64::saturating_add),
        average_latency_ms: latency,
    });

    Ok(buckets.into_values().collect())
}
