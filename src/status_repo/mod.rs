// Status aggregator: parallel history + shard fetch, bucketing, per-range cache.

pub mod aggregation;
mod cache;

pub use cache::{CacheEntry, DEFAULT_FRESHNESS, StatusCache};

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::instrument;

use crate::api_client::StatusApi;
use crate::error::FetchError;
use crate::models::{AggregatedPoint, TimeRange};

pub struct StatusAggregator<A> {
    api: A,
    cache: RwLock<StatusCache>,
}

impl<A: StatusApi> StatusAggregator<A> {
    pub fn new(api: A, cache: StatusCache) -> Self {
        Self {
            api,
            cache: RwLock::new(cache),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn load(&self, range: TimeRange) -> Result<Arc<Vec<AggregatedPoint>>, FetchError> {
        self.load_at(range, Utc::now()).await
    }

    /// Series for `range` as of `now`: fresh cache entry, or a full fetch + aggregate cycle.
    /// The new entry's age counts from when the fetch finished, not from `now`.
    /// A failed cycle leaves any existing entry in place.
    #[instrument(skip(self, now), fields(repo = "status", operation = "load", range = %range))]
    pub async fn load_at(
        &self,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Arc<Vec<AggregatedPoint>>, FetchError> {
        if let Some(cached) = self.cache.read().await.get_fresh(range, now) {
            tracing::debug!(points = cached.len(), "cache hit");
            return Ok(cached);
        }

        let started = Instant::now();
        let (history, shards) = tokio::try_join!(self.api.history(), self.api.shards())?;
        let points = Arc::new(aggregation::aggregate(&history, &shards, range, now)?);

        let elapsed = TimeDelta::from_std(started.elapsed()).unwrap_or(TimeDelta::zero());
        let fetched_at = now + elapsed;
        self.cache.write().await.insert(range, points.clone(), fetched_at);
        tracing::debug!(
            history_samples = history.len(),
            shards = shards.len(),
            points = points.len(),
            "aggregated"
        );
        Ok(points)
    }

    pub async fn cached(&self, range: TimeRange) -> Option<CacheEntry> {
        self.cache.read().await.get(range).cloned()
    }

    pub async fn reset_cache(&self) {
        self.cache.write().await.clear();
    }
}
