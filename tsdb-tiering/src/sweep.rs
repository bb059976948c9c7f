use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tsdb_core::Tier;
use tsdb_index::MetadataIndex;

use crate::classify::{classify, TierThresholds};

/// Count of every non-trivial `(old, new)` tier transition observed during
/// one sweep, keyed by direction rather than by collapsing into a single
/// "promotions"/"demotions" pair — a blob read during the sweep window can
/// re-qualify for HOT directly from COLD, so all six off-diagonal cells of
/// the 3x3 transition matrix are tracked.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransitionCounts {
    pub hot_to_warm: u64,
    pub hot_to_cold: u64,
    pub warm_to_hot: u64,
    pub warm_to_cold: u64,
    pub cold_to_hot: u64,
    pub cold_to_warm: u64,
}

impl TransitionCounts {
    fn record(&mut self, old: Tier, new: Tier) {
        use Tier::*;
        match (old, new) {
            (Hot, Warm) => self.hot_to_warm += 1,
            (Hot, Cold) => self.hot_to_cold += 1,
            (Warm, Hot) => self.warm_to_hot += 1,
            (Warm, Cold) => self.warm_to_cold += 1,
            (Cold, Hot) => self.cold_to_hot += 1,
            (Cold, Warm) => self.cold_to_warm += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> u64 {
        self.hot_to_warm
            + self.hot_to_cold
            + self.warm_to_hot
            + self.warm_to_cold
            + self.cold_to_hot
            + self.cold_to_warm
    }
}

/// Summary returned by a completed sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub scanned: u64,
    pub transitions: TransitionCounts,
    pub duration_ms: u64,
}

/// Scan `index`, reclassify every descriptor against `now`, and apply the
/// transitions that changed. This function never mutates the index or any
/// stats itself — it only decides, from the snapshot, which descriptors are
/// *candidates* for a transition. Applying one is entirely delegated to
/// `apply_transition`, which the caller must run under that blob's per-id
/// lock (this crate has no lock table of its own; only the coordinator
/// does). `apply_transition` is handed the stale snapshot descriptor and
/// the proposed new tier, and must itself call the index's `set_tier` (or
/// equivalent) under lock and return the tier the descriptor *actually* had
/// at that moment — `None` if the id is gone, raced out from under the
/// sweep by a concurrent delete. That return value, not the snapshot's
/// stale `descriptor.tier`, is what gets counted, so a transition is never
/// recorded against a blob that no longer exists or that another thread
/// already moved. A blob created or deleted mid-sweep may or may not be
/// included; newly created blobs are born HOT, which is always correct
/// regardless.
pub fn run_sweep(
    index: &MetadataIndex,
    thresholds: TierThresholds,
    now: DateTime<Utc>,
    mut apply_transition: impl FnMut(&tsdb_core::Descriptor, Tier) -> Option<Tier>,
) -> SweepSummary {
    let start = Instant::now();
    let descriptors = index.snapshot();
    let mut transitions = TransitionCounts::default();

    for descriptor in &descriptors {
        let age = now.signed_duration_since(descriptor.last_accessed);
        let new_tier = classify(age, thresholds);
        if new_tier == descriptor.tier {
            continue;
        }

        if let Some(previous) = apply_transition(descriptor, new_tier) {
            if previous != new_tier {
                transitions.record(previous, new_tier);
            }
        }
    }

    SweepSummary {
        scanned: descriptors.len() as u64,
        transitions,
        duration_ms: duration_to_ms(start.elapsed()),
    }
}

fn duration_to_ms(d: StdDuration) -> u64 {
    d.as_millis().min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdb_core::{checksum, BlobId, Descriptor};

    fn insert(index: &MetadataIndex, age_days: i64, now: DateTime<Utc>) -> BlobId {
        let id = BlobId::new();
        let mut d = Descriptor::new(
            id,
            "f".into(),
            "application/octet-stream".into(),
            1024 * 1024,
            checksum(b"x"),
            now - chrono::Duration::days(age_days),
        );
        d.created_at = now - chrono::Duration::days(age_days);
        index.insert(d);
        id
    }

    /// A stand-in for the engine's per-id-locked closure: these unit tests
    /// exercise `run_sweep` without a lock table, so each call here applies
    /// the transition directly to `index`, mirroring what `Engine::run_tiering`
    /// does under its `LockTable`.
    fn apply_directly(index: &MetadataIndex) -> impl FnMut(&Descriptor, Tier) -> Option<Tier> + '_ {
        move |descriptor, new_tier| index.set_tier(descriptor.id, new_tier)
    }

    #[test]
    fn sweep_promotes_and_demotes_correctly() {
        let index = MetadataIndex::new();
        let now = Utc::now();
        let hot_id = insert(&index, 0, now);
        let warm_id = insert(&index, 40, now);
        let cold_id = insert(&index, 200, now);

        let mut bucket_touches = Vec::new();
        let summary = run_sweep(&index, TierThresholds::default(), now, |descriptor, new_tier| {
            let previous = index.set_tier(descriptor.id, new_tier);
            if let Some(previous) = previous {
                bucket_touches.push((previous, new_tier, descriptor.size));
            }
            previous
        });

        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.transitions.hot_to_warm, 1);
        assert_eq!(summary.transitions.hot_to_cold, 1);
        assert_eq!(bucket_touches.len(), 2);

        assert_eq!(index.get(hot_id).unwrap().tier, Tier::Hot);
        assert_eq!(index.get(warm_id).unwrap().tier, Tier::Warm);
        assert_eq!(index.get(cold_id).unwrap().tier, Tier::Cold);
    }

    #[test]
    fn sweep_is_idempotent_once_converged() {
        let index = MetadataIndex::new();
        let now = Utc::now();
        insert(&index, 200, now);

        run_sweep(&index, TierThresholds::default(), now, apply_directly(&index));
        let summary = run_sweep(&index, TierThresholds::default(), now, apply_directly(&index));

        assert_eq!(summary.transitions.total(), 0);
    }

    #[test]
    fn read_during_window_can_jump_cold_to_hot_at_next_sweep() {
        let index = MetadataIndex::new();
        let now = Utc::now();
        let id = insert(&index, 200, now);
        run_sweep(&index, TierThresholds::default(), now, apply_directly(&index));
        assert_eq!(index.get(id).unwrap().tier, Tier::Cold);

        index.update_timestamp(id, now);
        let summary = run_sweep(&index, TierThresholds::default(), now, apply_directly(&index));
        assert_eq!(summary.transitions.cold_to_hot, 1);
        assert_eq!(index.get(id).unwrap().tier, Tier::Hot);
    }

    /// Simulates the race the engine must close: a blob is deleted (here,
    /// removed directly from the index, standing in for
    /// `Engine::delete` under its per-id lock) between the sweep's
    /// snapshot and the moment its transition would be applied. The
    /// closure's `None` return must suppress the transition entirely
    /// rather than counting a phantom move for a blob that no longer
    /// exists.
    #[test]
    fn transition_is_skipped_for_a_blob_deleted_mid_sweep() {
        let index = MetadataIndex::new();
        let now = Utc::now();
        let id = insert(&index, 200, now);

        let summary = run_sweep(&index, TierThresholds::default(), now, |descriptor, new_tier| {
            index.remove(descriptor.id);
            index.set_tier(descriptor.id, new_tier)
        });

        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.transitions.total(), 0);
        assert!(index.get(id).is_none());
    }
}
