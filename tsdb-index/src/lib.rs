//! In-memory metadata index: the primary source of truth for blob
//! existence, size, tier, and timestamps.
//!
//! Modeled on this workspace's `TieringManager::metadata` field (a single
//! `RwLock<HashMap<_, _>>`): one lock domain keyed by identifier, so a
//! snapshot for a tiering sweep never requires holding a writer out.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tsdb_core::{BlobId, Descriptor, Tier};

/// Result of an [`MetadataIndex::insert`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Conflict,
}

#[derive(Default)]
pub struct MetadataIndex {
    inner: RwLock<HashMap<BlobId, Descriptor>>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Succeeds iff `descriptor.id` is not already present.
    pub fn insert(&self, descriptor: Descriptor) -> InsertOutcome {
        let mut guard = self.inner.write().expect("metadata index lock poisoned");
        if guard.contains_key(&descriptor.id) {
            return InsertOutcome::Conflict;
        }
        guard.insert(descriptor.id, descriptor);
        InsertOutcome::Inserted
    }

    pub fn get(&self, id: BlobId) -> Option<Descriptor> {
        self.inner
            .read()
            .expect("metadata index lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn remove(&self, id: BlobId) -> Option<Descriptor> {
        self.inner
            .write()
            .expect("metadata index lock poisoned")
            .remove(&id)
    }

    /// A point-in-time clone of every descriptor, safe to scan without
    /// holding the index's lock.
    pub fn snapshot(&self) -> Vec<Descriptor> {
        self.inner
            .read()
            .expect("metadata index lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("metadata index lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Idempotent advance of `last_accessed`; never regresses it. Returns
    /// the descriptor as it stood after the update, or `None` if absent.
    pub fn update_timestamp(&self, id: BlobId, t: DateTime<Utc>) -> Option<Descriptor> {
        let mut guard = self.inner.write().expect("metadata index lock poisoned");
        let descriptor = guard.get_mut(&id)?;
        if t > descriptor.last_accessed {
            descriptor.last_accessed = t;
        }
        Some(descriptor.clone())
    }

    /// Administrative override: sets `last_accessed` unconditionally,
    /// including backwards in time, unlike [`Self::update_timestamp`]'s
    /// monotonic guard. Used only by the admin aging hook.
    pub fn force_last_accessed(&self, id: BlobId, t: DateTime<Utc>) -> Option<()> {
        let mut guard = self.inner.write().expect("metadata index lock poisoned");
        let descriptor = guard.get_mut(&id)?;
        descriptor.last_accessed = t;
        Some(())
    }

    /// Used exclusively by the tiering sweep. Returns the descriptor's
    /// previous tier, or `None` if the id is gone (raced with a delete).
    pub fn set_tier(&self, id: BlobId, tier: Tier) -> Option<Tier> {
        let mut guard = self.inner.write().expect("metadata index lock poisoned");
        let descriptor = guard.get_mut(&id)?;
        let previous = descriptor.tier;
        descriptor.tier = tier;
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdb_core::checksum;

    fn descriptor(id: BlobId, now: DateTime<Utc>) -> Descriptor {
        Descriptor::new(
            id,
            "a.bin".into(),
            "application/octet-stream".into(),
            2_097_152,
            checksum(b"x"),
            now,
        )
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let index = MetadataIndex::new();
        let id = BlobId::new();
        let now = Utc::now();
        assert_eq!(index.insert(descriptor(id, now)), InsertOutcome::Inserted);
        assert_eq!(index.insert(descriptor(id, now)), InsertOutcome::Conflict);
    }

    #[test]
    fn remove_is_final() {
        let index = MetadataIndex::new();
        let id = BlobId::new();
        index.insert(descriptor(id, Utc::now()));
        assert!(index.remove(id).is_some());
        assert!(index.get(id).is_none());
        assert!(index.remove(id).is_none());
    }

    #[test]
    fn update_timestamp_never_regresses() {
        let index = MetadataIndex::new();
        let id = BlobId::new();
        let t0 = Utc::now();
        index.insert(descriptor(id, t0));

        let t1 = t0 + chrono::Duration::seconds(10);
        index.update_timestamp(id, t1);
        assert_eq!(index.get(id).unwrap().last_accessed, t1);

        let earlier = t0 - chrono::Duration::seconds(10);
        index.update_timestamp(id, earlier);
        assert_eq!(index.get(id).unwrap().last_accessed, t1);
    }

    #[test]
    fn force_last_accessed_can_move_backwards() {
        let index = MetadataIndex::new();
        let id = BlobId::new();
        let now = Utc::now();
        index.insert(descriptor(id, now));

        let earlier = now - chrono::Duration::days(100);
        index.force_last_accessed(id, earlier);
        assert_eq!(index.get(id).unwrap().last_accessed, earlier);
    }

    #[test]
    fn set_tier_returns_previous_tier() {
        let index = MetadataIndex::new();
        let id = BlobId::new();
        index.insert(descriptor(id, Utc::now()));
        let previous = index.set_tier(id, Tier::Warm).unwrap();
        assert_eq!(previous, Tier::Hot);
        assert_eq!(index.get(id).unwrap().tier, Tier::Warm);
    }

    #[test]
    fn snapshot_reflects_inserted_descriptors() {
        let index = MetadataIndex::new();
        for _ in 0..5 {
            index.insert(descriptor(BlobId::new(), Utc::now()));
        }
        assert_eq!(index.snapshot().len(), 5);
        assert_eq!(index.len(), 5);
    }
}
