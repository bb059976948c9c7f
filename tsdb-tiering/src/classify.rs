use chrono::Duration;
use serde::{Deserialize, Serialize};
use tsdb_core::limits;
use tsdb_core::Tier;

/// Age thresholds the classifier uses. Configurable, but defaults to a
/// fixed 30 / 90 day split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierThresholds {
    pub hot_max_age_days: i64,
    pub warm_max_age_days: i64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            hot_max_age_days: limits::HOT_MAX_AGE_DAYS,
            warm_max_age_days: limits::WARM_MAX_AGE_DAYS,
        }
    }
}

/// Pure classification: `age = now - last_accessed`, thresholds fixed at
/// sweep start. Total function — every `age` maps to exactly one tier.
pub fn classify(age: Duration, thresholds: TierThresholds) -> Tier {
    if age <= Duration::days(thresholds.hot_max_age_days) {
        Tier::Hot
    } else if age <= Duration::days(thresholds.warm_max_age_days) {
        Tier::Warm
    } else {
        Tier::Cold
    }
}
