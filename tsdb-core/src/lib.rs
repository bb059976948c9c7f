//! Shared data model for the tiered object store: blob identifiers,
//! descriptors, tiers, size limits, and the error taxonomy every other
//! crate in this workspace builds on.

mod descriptor;
mod error;
mod id;
pub mod limits;
mod tier;

pub use descriptor::{checksum, Descriptor};
pub use error::EngineError;
pub use id::{BlobId, BlobIdError};
pub use tier::Tier;
