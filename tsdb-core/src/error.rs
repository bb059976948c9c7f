use thiserror::Error;

/// Error taxonomy the engine surfaces to callers. `Conflict` (id-mint
/// collision) is deliberately absent: it is retried internally by the
/// coordinator and never escapes as a variant a caller can observe.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidSize(String),

    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    MissingFile(String),

    #[error("{0}")]
    NotFound(String),

    /// Invariant violation. The caller must fail loudly; the message is for
    /// logs only and must never be forwarded verbatim to a client.
    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        EngineError::NotFound(format!("blob {id} not found"))
    }

    pub fn too_small(size: u64, min: u64) -> Self {
        EngineError::InvalidSize(format!(
            "payload too small: {size} bytes (minimum {min} bytes)"
        ))
    }

    pub fn too_large(size: u64, max: u64) -> Self {
        EngineError::InvalidSize(format!(
            "payload too large: {size} bytes (maximum {max} bytes)"
        ))
    }
}
