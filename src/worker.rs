// Background refresh worker: re-runs the status aggregation and the shard panel on a
// fixed interval (the cache freshness window) until shutdown.

use std::sync::Arc;

use tokio::time::{Duration, interval};

use crate::api_client::StatusApi;
use crate::dashboard::{RefreshOutcome, StatusDashboard};

pub struct RefreshWorkerConfig {
    pub refresh_interval: Duration,
    /// How often to log refresh counters (real seconds).
    pub stats_log_interval_secs: u64,
}

#[derive(Debug, Default)]
struct RefreshCounters {
    applied: u64,
    failed: u64,
    superseded: u64,
}

impl RefreshCounters {
    fn record(&mut self, outcome: RefreshOutcome) {
        match outcome {
            RefreshOutcome::Applied => self.applied += 1,
            RefreshOutcome::Failed => self.failed += 1,
            RefreshOutcome::Superseded => self.superseded += 1,
        }
    }
}

/// First tick fires immediately, so the dashboard is populated right after startup.
/// On shutdown the dashboard is detached and an in-flight refresh is dropped unfinished.
pub fn spawn<A>(
    dashboard: Arc<StatusDashboard<A>>,
    config: RefreshWorkerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    A: StatusApi + 'static,
{
    let RefreshWorkerConfig {
        refresh_interval,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(refresh_interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut status = RefreshCounters::default();
        let mut shards = RefreshCounters::default();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    // Shutdown must win over a refresh still waiting on the network.
                    tokio::select! {
                        (status_outcome, shard_outcome) = async {
                            tokio::join!(dashboard.refresh(), dashboard.refresh_shards())
                        } => {
                            status.record(status_outcome);
                            shards.record(shard_outcome);
                            tracing::debug!(
                                operation = "refresh_tick",
                                status = ?status_outcome,
                                shards = ?shard_outcome,
                                "refresh tick done"
                            );
                        }
                        _ = &mut shutdown_rx => {
                            tracing::debug!("Refresh worker shutting down mid-refresh");
                            dashboard.detach().await;
                            break;
                        }
                    }
                }
                _ = stats_log_tick.tick() => {
                    let range = dashboard.range().await;
                    tracing::info!(
                        %range,
                        status_applied = status.applied,
                        status_failed = status.failed,
                        status_superseded = status.superseded,
                        shards_applied = shards.applied,
                        shards_failed = shards.failed,
                        "app stats"
                    );
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Refresh worker shutting down");
                    dashboard.detach().await;
                    break;
                }
            }
        }
    })
}
