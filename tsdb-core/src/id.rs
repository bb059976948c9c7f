use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque, server-minted blob identifier — a UUIDv4 rendered canonically
/// (hex-with-hyphens). Never accepted from a client; always produced by
/// [`BlobId::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(Uuid);

#[derive(Debug, Error)]
#[error("malformed blob identifier: {0}")]
pub struct BlobIdError(String);

impl BlobId {
    /// Mint a fresh, random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for BlobId {
    type Err = BlobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(BlobId)
            .map_err(|_| BlobIdError(s.to_string()))
    }
}
