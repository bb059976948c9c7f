use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::id::BlobId;
use crate::tier::Tier;

/// Metadata record for one stored blob. Every field but `last_accessed` and
/// `tier` is immutable for the blob's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub tier: Tier,
    pub checksum: String,
}

impl Descriptor {
    /// Build a freshly-created descriptor: born HOT, `last_accessed` equal
    /// to `created_at`.
    pub fn new(
        id: BlobId,
        filename: String,
        content_type: String,
        size: u64,
        checksum: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            filename,
            content_type,
            size,
            created_at: now,
            last_accessed: now,
            tier: Tier::Hot,
            checksum,
        }
    }
}

/// SHA-256 of `bytes`, as a lowercase hex digest.
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_lower(&hasher.finalize())
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{:02x}", b).expect("writing to a String cannot fail");
    }
    out
}
