// Domain models: telemetry wire types and chart-ready aggregates

mod aggregation;
mod history;
mod shard;

pub use aggregation::{AggregatedPoint, Granularity, PeriodChange, TimeRange};
pub use history::{RawHistorySample, parse_timestamp};
pub use shard::{ShardPanel, ShardRow, ShardSnapshot, ShardSummary, format_uptime};
