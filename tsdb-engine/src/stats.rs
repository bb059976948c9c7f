use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tsdb_core::Tier;
use tsdb_tiering::TierThresholds;

/// Count and byte total for one tier bucket.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct TierBucket {
    pub count: u64,
    pub size: u64,
}

/// A consistent snapshot of the six aggregate counters plus the thresholds
/// that produced the current tier assignment — returned by [`StatsAggregator::snapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_files: u64,
    pub total_size: u64,
    pub hot: TierBucket,
    pub warm: TierBucket,
    pub cold: TierBucket,
    pub thresholds: TierThresholds,
}

#[derive(Debug, Default)]
struct StatsInner {
    total_files: u64,
    total_size: u64,
    hot: TierBucket,
    warm: TierBucket,
    cold: TierBucket,
}

impl StatsInner {
    fn bucket_mut(&mut self, tier: Tier) -> &mut TierBucket {
        match tier {
            Tier::Hot => &mut self.hot,
            Tier::Warm => &mut self.warm,
            Tier::Cold => &mut self.cold,
        }
    }
}

/// Incrementally-maintained aggregate counters. One mutex guards all six
/// fields so that every mutating operation moves them as a single atomic
/// update and `snapshot()` never observes a transient violation of "bucket
/// sums equal totals".
pub struct StatsAggregator {
    inner: Mutex<StatsInner>,
    thresholds: TierThresholds,
}

impl StatsAggregator {
    pub fn new(thresholds: TierThresholds) -> Self {
        Self {
            inner: Mutex::new(StatsInner::default()),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> TierThresholds {
        self.thresholds
    }

    /// Record a newly created blob, always HOT.
    pub fn record_create(&self, size: u64) {
        let mut guard = self.inner.lock().expect("stats lock poisoned");
        guard.total_files += 1;
        guard.total_size += size;
        let bucket = guard.bucket_mut(Tier::Hot);
        bucket.count += 1;
        bucket.size += size;
    }

    /// Record a deletion from `tier`.
    pub fn record_delete(&self, tier: Tier, size: u64) {
        let mut guard = self.inner.lock().expect("stats lock poisoned");
        guard.total_files = guard.total_files.saturating_sub(1);
        guard.total_size = guard.total_size.saturating_sub(size);
        let bucket = guard.bucket_mut(tier);
        bucket.count = bucket.count.saturating_sub(1);
        bucket.size = bucket.size.saturating_sub(size);
    }

    /// Record one sweep transition: decrement the old bucket, increment the
    /// new one, leaving totals untouched (the blob still exists).
    pub fn record_transition(&self, old: Tier, new: Tier, size: u64) {
        let mut guard = self.inner.lock().expect("stats lock poisoned");
        {
            let old_bucket = guard.bucket_mut(old);
            old_bucket.count = old_bucket.count.saturating_sub(1);
            old_bucket.size = old_bucket.size.saturating_sub(size);
        }
        let new_bucket = guard.bucket_mut(new);
        new_bucket.count += 1;
        new_bucket.size += size;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let guard = self.inner.lock().expect("stats lock poisoned");
        StatsSnapshot {
            total_files: guard.total_files,
            total_size: guard.total_size,
            hot: guard.hot,
            warm: guard.warm,
            cold: guard.cold,
            thresholds: self.thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_delete_keep_sums_consistent() {
        let stats = StatsAggregator::new(TierThresholds::default());
        for _ in 0..10 {
            stats.record_create(2 * 1024 * 1024);
        }
        let snap = stats.snapshot();
        assert_eq!(snap.total_files, 10);
        assert_eq!(snap.total_size, 20 * 1024 * 1024);
        assert_eq!(snap.hot.count, 10);

        for _ in 0..3 {
            stats.record_delete(Tier::Hot, 2 * 1024 * 1024);
        }
        let snap = stats.snapshot();
        assert_eq!(snap.total_files, 7);
        assert_eq!(snap.total_size, 14 * 1024 * 1024);
        assert_eq!(snap.hot.count, 7);
    }

    #[test]
    fn transition_moves_bucket_without_touching_totals() {
        let stats = StatsAggregator::new(TierThresholds::default());
        stats.record_create(1024 * 1024);
        stats.record_transition(Tier::Hot, Tier::Warm, 1024 * 1024);

        let snap = stats.snapshot();
        assert_eq!(snap.total_files, 1);
        assert_eq!(snap.hot.count, 0);
        assert_eq!(snap.warm.count, 1);
    }

    #[test]
    fn bucket_sums_always_equal_totals() {
        let stats = StatsAggregator::new(TierThresholds::default());
        stats.record_create(1024 * 1024);
        stats.record_create(1024 * 1024);
        stats.record_transition(Tier::Hot, Tier::Cold, 1024 * 1024);

        let snap = stats.snapshot();
        let bucket_files = snap.hot.count + snap.warm.count + snap.cold.count;
        let bucket_size = snap.hot.size + snap.warm.size + snap.cold.size;
        assert_eq!(bucket_files, snap.total_files);
        assert_eq!(bucket_size, snap.total_size);
    }
}
