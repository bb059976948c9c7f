//! HTTP surface for the tiered object store: an axum router implementing
//! the wire contract over [`tsdb_engine::Engine`]. Transport plumbing only —
//! every operation is a thin `spawn_blocking` call into the synchronous
//! engine, which owns all of the actual locking and validation.

mod dto;
mod error;
mod handlers;
mod router;
mod state;

pub use error::ApiError;
pub use router::{build_router, build_router_with_state};
pub use state::AppState;
pub use tsdb_engine::Engine;
