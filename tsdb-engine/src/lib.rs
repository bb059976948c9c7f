//! Request coordinator: the component that actually executes public
//! operations (`create`, `read`, `get_metadata`, `delete`, `run_tiering`,
//! `stats`, the admin aging hook), serializing mutations per blob id and
//! keeping the stats aggregator consistent under its own lock.

mod engine;
mod locks;
mod stats;

pub use engine::Engine;
pub use stats::{StatsSnapshot, TierBucket};
pub use tsdb_tiering::{SweepSummary, TierThresholds, TransitionCounts};
