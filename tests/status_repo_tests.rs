// StatusAggregator tests: cache hits, staleness, failure keeps cache, all-or-nothing fetch.
// Paused clock, so fetch durations are exact.

mod common;

use chrono::TimeDelta;
use common::{MockApi, sample, shard, ts};
use evelina_status::error::FetchError;
use evelina_status::models::TimeRange;
use evelina_status::status_repo::{StatusAggregator, StatusCache};
use std::sync::Arc;
use std::time::Duration;

fn aggregator() -> (Arc<MockApi>, StatusAggregator<Arc<MockApi>>) {
    let api = Arc::new(MockApi::new(
        vec![
            sample("2024-01-01T10:15:00Z", 100, 5000, 50.0),
            sample("2024-01-01T11:20:00Z", 102, 5020, 45.0),
        ],
        vec![shard(0, 40.0, 60, 2600), shard(1, 60.0, 45, 2500)],
    ));
    let aggregator =
        StatusAggregator::new(api.clone(), StatusCache::new(Duration::from_secs(60)));
    (api, aggregator)
}

#[tokio::test(start_paused = true)]
async fn second_load_within_freshness_window_hits_cache() {
    let (api, aggregator) = aggregator();
    let now = ts("2024-01-01T12:30:00Z");

    let first = aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();
    assert_eq!(api.calls(), 2);

    let second = aggregator
        .load_at(TimeRange::Last24Hours, now + TimeDelta::seconds(59))
        .await
        .unwrap();
    assert_eq!(api.calls(), 2);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test(start_paused = true)]
async fn each_range_has_its_own_entry() {
    let (api, aggregator) = aggregator();
    let now = ts("2024-01-01T12:30:00Z");

    aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();
    let week = aggregator.load_at(TimeRange::Last7Days, now).await.unwrap();
    assert_eq!(api.calls(), 4);
    assert_eq!(week.first().unwrap().timestamp, ts("2024-01-01T00:00:00Z"));
}

#[tokio::test(start_paused = true)]
async fn stale_entry_is_refetched_and_replaced() {
    let (api, aggregator) = aggregator();
    let now = ts("2024-01-01T12:30:00Z");

    aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();
    api.set_shards(Ok(vec![shard(0, 10.0, 500, 9000)]));
    let later = now + TimeDelta::seconds(61);
    let refreshed = aggregator
        .load_at(TimeRange::Last24Hours, later)
        .await
        .unwrap();

    assert_eq!(api.calls(), 4);
    assert_eq!(refreshed.last().unwrap().total_servers, 500);
    let entry = aggregator.cached(TimeRange::Last24Hours).await.unwrap();
    assert_eq!(entry.fetched_at, later);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_entry() {
    let (api, aggregator) = aggregator();
    let now = ts("2024-01-01T12:30:00Z");
    let good = aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();

    api.set_history(Err(FetchError::Timeout));
    let err = aggregator
        .load_at(TimeRange::Last24Hours, now + TimeDelta::minutes(5))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout);

    let entry = aggregator.cached(TimeRange::Last24Hours).await.unwrap();
    assert_eq!(entry.fetched_at, now);
    assert_eq!(entry.data, good);
}

#[tokio::test(start_paused = true)]
async fn one_failing_source_fails_the_whole_cycle() {
    let (api, aggregator) = aggregator();
    api.set_shards(Err(FetchError::Http {
        status: 502,
        body: "bad gateway".into(),
    }));

    let err = aggregator
        .load_at(TimeRange::Last24Hours, ts("2024-01-01T12:30:00Z"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP error 502: bad gateway");
    assert!(aggregator.cached(TimeRange::Last24Hours).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn empty_history_is_not_cached() {
    let (api, aggregator) = aggregator();
    api.set_history(Ok(vec![]));

    let err = aggregator
        .load_at(TimeRange::All, ts("2024-01-01T12:30:00Z"))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::EmptyData("history"));
    assert!(aggregator.cached(TimeRange::All).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_cache_forces_refetch() {
    let (api, aggregator) = aggregator();
    let now = ts("2024-01-01T12:30:00Z");

    aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();
    aggregator.reset_cache().await;
    aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();
    assert_eq!(api.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn entry_age_counts_from_fetch_completion() {
    let (api, aggregator) = aggregator();
    api.set_delay(Duration::from_secs(30));
    let now = ts("2024-01-01T12:30:00Z");

    aggregator.load_at(TimeRange::Last24Hours, now).await.unwrap();
    let entry = aggregator.cached(TimeRange::Last24Hours).await.unwrap();
    assert_eq!(entry.fetched_at, now + TimeDelta::seconds(30));

    aggregator
        .load_at(TimeRange::Last24Hours, now + TimeDelta::seconds(75))
        .await
        .unwrap();
    assert_eq!(api.calls(), 2);
}
