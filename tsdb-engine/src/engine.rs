use bytes::Bytes;
use chrono::Utc;
use tsdb_content::ContentStore;
use tsdb_core::{checksum, limits, BlobId, Descriptor, EngineError};
use tsdb_index::{InsertOutcome, MetadataIndex};
use tsdb_tiering::{run_sweep, SweepSummary, TierThresholds};

use crate::locks::LockTable;
use crate::stats::{StatsAggregator, StatsSnapshot};

/// Maximum number of fresh-id mint attempts before giving up. A collision
/// on a random UUIDv4 is astronomically unlikely; this bound exists so a
/// broken RNG fails loudly instead of looping forever.
const MAX_MINT_ATTEMPTS: u32 = 8;

/// The request coordinator: serializes mutations per blob id, keeps the
/// stats aggregator consistent, validates inputs before any state change,
/// and refreshes access timestamps on read. This is the only component
/// allowed to mutate the index, the content store, or the stats counters.
pub struct Engine {
    index: MetadataIndex,
    content: ContentStore,
    stats: StatsAggregator,
    locks: LockTable,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_thresholds(TierThresholds::default())
    }

    pub fn with_thresholds(thresholds: TierThresholds) -> Self {
        Self {
            index: MetadataIndex::new(),
            content: ContentStore::new(),
            stats: StatsAggregator::new(thresholds),
            locks: LockTable::default(),
        }
    }

    /// Validate, mint an id, and atomically create the descriptor + payload
    /// pair. No partial state is ever left behind: validation runs before
    /// any mutation, and the insert under the per-id lock either succeeds
    /// completely or (on a vanishingly rare id collision) is retried with a
    /// fresh id.
    pub fn create(
        &self,
        filename: String,
        content_type: String,
        bytes: Bytes,
    ) -> Result<BlobId, EngineError> {
        let size = bytes.len() as u64;
        if size < limits::MIN_SIZE {
            return Err(EngineError::too_small(size, limits::MIN_SIZE));
        }
        if size > limits::MAX_SIZE {
            return Err(EngineError::too_large(size, limits::MAX_SIZE));
        }

        let digest = checksum(&bytes);
        let now = Utc::now();

        for attempt in 0..MAX_MINT_ATTEMPTS {
            let id = BlobId::new();
            let _guard = self.locks.lock(id);

            let descriptor = Descriptor::new(
                id,
                filename.clone(),
                content_type.clone(),
                size,
                digest.clone(),
                now,
            );

            match self.index.insert(descriptor) {
                InsertOutcome::Conflict => {
                    tracing::warn!(attempt, "blob id collision on mint, retrying");
                    continue;
                }
                InsertOutcome::Inserted => {
                    self.content.put(id, bytes);
                    self.stats.record_create(size);
                    tracing::debug!(blob_id = %id, size, "blob created");
                    return Ok(id);
                }
            }
        }

        Err(EngineError::Internal(
            "exhausted identifier mint attempts".into(),
        ))
    }

    /// Full read. Advances `last_accessed` to `now` as part of the same
    /// per-id critical section; tier is not recomputed here, only by the
    /// bulk sweep.
    pub fn read(&self, id: BlobId) -> Result<(Descriptor, Bytes), EngineError> {
        let _guard = self.locks.lock(id);

        let now = Utc::now();
        let descriptor = self
            .index
            .update_timestamp(id, now)
            .ok_or_else(|| EngineError::not_found(id))?;

        let bytes = self.content.get(id).ok_or_else(|| {
            EngineError::Internal(format!(
                "pairing invariant violated: descriptor {id} has no payload"
            ))
        })?;

        Ok((descriptor, bytes))
    }

    /// Descriptor-only read. Does not refresh `last_accessed` — only a
    /// full read counts as an access for aging purposes.
    pub fn get_metadata(&self, id: BlobId) -> Result<Descriptor, EngineError> {
        let _guard = self.locks.lock(id);
        self.index.get(id).ok_or_else(|| EngineError::not_found(id))
    }

    /// Atomically remove descriptor + payload and retire their stats.
    pub fn delete(&self, id: BlobId) -> Result<(), EngineError> {
        let _guard = self.locks.lock(id);

        let descriptor = self
            .index
            .remove(id)
            .ok_or_else(|| EngineError::not_found(id))?;
        self.content.remove(id);
        self.stats.record_delete(descriptor.tier, descriptor.size);
        tracing::debug!(blob_id = %id, "blob deleted");
        Ok(())
    }

    /// Administrative override used to age a blob for testing: sets
    /// `last_accessed = now - days_ago`. Tier is left untouched until the
    /// next sweep, so tier transitions happen in exactly one place.
    pub fn admin_update_last_accessed(&self, id: BlobId, days_ago: u64) -> Result<(), EngineError> {
        let _guard = self.locks.lock(id);

        let target = Utc::now() - chrono::Duration::days(days_ago as i64);
        self.index
            .force_last_accessed(id, target)
            .ok_or_else(|| EngineError::not_found(id))
    }

    /// Run one tiering sweep: classify every descriptor against a single
    /// `now`, move transitioned blobs' tier, and update stats buckets
    /// atomically per transition.
    ///
    /// `tsdb_tiering::run_sweep` only decides which descriptors, per its
    /// snapshot, are *candidates* for a transition; applying one is done
    /// here, under that blob's per-id lock, exactly like every other
    /// mutation this engine performs. Taking the lock here — rather than
    /// inside the tiering crate, which has no lock table — closes the race
    /// against a concurrent `delete`: if the blob was removed between the
    /// sweep's snapshot and this closure running, `index.set_tier` returns
    /// `None` and the transition (and its stats update) is dropped entirely
    /// instead of double-counting a bucket for a blob that no longer
    /// exists.
    pub fn run_tiering(&self) -> SweepSummary {
        let now = Utc::now();
        let summary = run_sweep(&self.index, self.stats.thresholds(), now, |descriptor, new_tier| {
            let _guard = self.locks.lock(descriptor.id);
            let previous = self.index.set_tier(descriptor.id, new_tier)?;
            if previous != new_tier {
                self.stats.record_transition(previous, new_tier, descriptor.size);
            }
            Some(previous)
        });
        tracing::info!(
            scanned = summary.scanned,
            transitions = summary.transitions.total(),
            duration_ms = summary.duration_ms,
            "tiering sweep complete"
        );
        summary
    }

    /// Consistent snapshot of the six aggregate counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
