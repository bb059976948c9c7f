//! In-memory content store: the payload half of the blob store. Paired with
//! [`tsdb_index::MetadataIndex`] by the coordinator crate, `tsdb-engine`;
//! this crate does not enforce pairing on its own, that responsibility
//! belongs entirely to the coordinator.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tsdb_core::BlobId;

#[derive(Default)]
pub struct ContentStore {
    inner: RwLock<HashMap<BlobId, Bytes>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn put(&self, id: BlobId, bytes: Bytes) {
        self.inner
            .write()
            .expect("content store lock poisoned")
            .insert(id, bytes);
    }

    pub fn get(&self, id: BlobId) -> Option<Bytes> {
        self.inner
            .read()
            .expect("content store lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn remove(&self, id: BlobId) -> Option<Bytes> {
        self.inner
            .write()
            .expect("content store lock poisoned")
            .remove(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("content store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
