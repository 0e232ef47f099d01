// Per-range cache of aggregated series. Entries are swapped whole, never merged.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{AggregatedPoint, TimeRange};

pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<Vec<AggregatedPoint>>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct StatusCache {
    entries: HashMap<TimeRange, CacheEntry>,
    freshness: TimeDelta,
}

impl StatusCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            freshness: TimeDelta::from_std(freshness).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Entry for `range` if younger than the freshness window at `now`. Stale entries stay.
    pub fn get_fresh(
        &self,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Option<Arc<Vec<AggregatedPoint>>> {
        let entry = self.entries.get(&range)?;
        (now - entry.fetched_at < self.freshness).then(|| entry.data.clone())
    }

    /// Entry for `range` regardless of age.
    pub fn get(&self, range: TimeRange) -> Option<&CacheEntry> {
        self.entries.get(&range)
    }

    pub fn insert(
        &mut self,
        range: TimeRange,
        data: Arc<Vec<AggregatedPoint>>,
        fetched_at: DateTime<Utc>,
    ) {
        self.entries.insert(range, CacheEntry { data, fetched_at });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}
