// Dashboard state for one consumer of the status page.
// Each refresh captures a generation number; its result is committed only while that
// generation (and the range it was started for) is still current.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::api_client::StatusApi;
use crate::models::{
    AggregatedPoint, PeriodChange, ShardPanel, ShardRow, ShardSnapshot, ShardSummary, TimeRange,
};
use crate::status_repo::StatusAggregator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Failed,
    /// A newer request or a range change happened meanwhile; result dropped.
    Superseded,
}

/// Identifies one refresh; see `StatusDashboard::begin_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub range: TimeRange,
}

/// Serializable snapshot served by GET /api/status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub range: TimeRange,
    pub phase: LoadPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub points: Vec<AggregatedPoint>,
    pub period_change: Option<PeriodChange>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct DashboardState {
    range: TimeRange,
    phase: LoadPhase,
    points: Arc<Vec<AggregatedPoint>>,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    shards: Vec<ShardSnapshot>,
    shards_loading: bool,
    shards_error: Option<String>,
    shards_updated: Option<DateTime<Utc>>,
}

pub struct StatusDashboard<A> {
    aggregator: StatusAggregator<A>,
    state: RwLock<DashboardState>,
    generation: AtomicU64,
    shard_generation: AtomicU64,
}

impl<A: StatusApi> StatusDashboard<A> {
    pub fn new(aggregator: StatusAggregator<A>, range: TimeRange) -> Self {
        Self {
            aggregator,
            state: RwLock::new(DashboardState {
                range,
                phase: LoadPhase::Idle,
                points: Arc::new(Vec::new()),
                error: None,
                last_updated: None,
                shards: Vec::new(),
                shards_loading: false,
                shards_error: None,
                shards_updated: None,
            }),
            generation: AtomicU64::new(0),
            shard_generation: AtomicU64::new(0),
        }
    }

    pub async fn range(&self) -> TimeRange {
        self.state.read().await.range
    }

    /// Makes `range` active. Points of the previous range are dropped and any
    /// in-flight refresh is invalidated. Returns false if `range` was already active.
    pub async fn set_range(&self, range: TimeRange) -> bool {
        let mut state = self.state.write().await;
        if state.range == range {
            return false;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::info!(from = %state.range, to = %range, "range selected");
        state.range = range;
        state.points = Arc::new(Vec::new());
        state.error = None;
        state.last_updated = None;
        state.phase = LoadPhase::Idle;
        true
    }

    pub async fn select_range(&self, range: TimeRange) -> RefreshOutcome {
        self.set_range(range).await;
        self.refresh().await
    }

    /// Reloads the active range. On failure the displayed points stay as they were.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.begin_refresh().await;
        self.complete_refresh(ticket).await
    }

    /// Enters the loading phase and captures the generation the result must match.
    pub async fn begin_refresh(&self) -> RefreshTicket {
        let mut state = self.state.write().await;
        state.phase = LoadPhase::Loading;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RefreshTicket {
            generation,
            range: state.range,
        }
    }

    #[instrument(skip(self), fields(operation = "refresh", range = %ticket.range))]
    pub async fn complete_refresh(&self, ticket: RefreshTicket) -> RefreshOutcome {
        let RefreshTicket { generation, range } = ticket;
        let result = self.aggregator.load(range).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation || state.range != range {
            tracing::debug!(generation, "discarding superseded result");
            return RefreshOutcome::Superseded;
        }
        match result {
            Ok(points) => {
                state.points = points;
                state.error = None;
                state.last_updated = Some(Utc::now());
                state.phase = LoadPhase::Ready;
                RefreshOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error_kind = e.kind(), error = %e, "status refresh failed");
                state.error = Some(e.to_string());
                state.phase = LoadPhase::Idle;
                RefreshOutcome::Failed
            }
        }
    }

    /// Manual retry from the error panel.
    pub async fn retry(&self) -> RefreshOutcome {
        tracing::info!("manual retry");
        self.refresh().await
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.error = None;
    }

    /// Reloads the live shard panel.
    #[instrument(skip(self), fields(operation = "refresh_shards"))]
    pub async fn refresh_shards(&self) -> RefreshOutcome {
        let generation = {
            let mut state = self.state.write().await;
            state.shards_loading = true;
            self.shard_generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let result = self.aggregator.api().shards().await;

        let mut state = self.state.write().await;
        if self.shard_generation.load(Ordering::SeqCst) != generation {
            return RefreshOutcome::Superseded;
        }
        state.shards_loading = false;
        match result {
            Ok(shards) => {
                state.shards = shards;
                state.shards_error = None;
                state.shards_updated = Some(Utc::now());
                RefreshOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error_kind = e.kind(), error = %e, "shard refresh failed");
                state.shards_error = Some(e.to_string());
                RefreshOutcome::Failed
            }
        }
    }

    /// Teardown: results of requests still in flight are dropped.
    pub async fn detach(&self) {
        let mut state = self.state.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.shard_generation.fetch_add(1, Ordering::SeqCst);
        state.phase = LoadPhase::Idle;
        state.shards_loading = false;
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.read().await;
        DashboardView {
            range: state.range,
            phase: state.phase,
            loading: state.phase == LoadPhase::Loading,
            error: state.error.clone(),
            points: state.points.as_ref().clone(),
            period_change: PeriodChange::over(&state.points),
            last_updated: state.last_updated,
        }
    }

    pub async fn shard_panel(&self) -> ShardPanel {
        let state = self.state.read().await;
        ShardPanel {
            loading: state.shards_loading,
            error: state.shards_error.clone(),
            summary: ShardSummary::from_shards(&state.shards),
            shards: state.shards.iter().map(ShardRow::from).collect(),
            last_updated: state.shards_updated,
        }
    }
}
