use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use tsdb_engine::Engine;

pub fn build_router(engine: Engine) -> Router {
    build_router_with_state(AppState::new(engine))
}

pub fn build_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/files", post(handlers::upload))
        .route("/files/:id", get(handlers::download).delete(handlers::delete))
        .route("/files/:id/metadata", get(handlers::metadata))
        .route("/admin/tiering/run", post(handlers::run_tiering))
        .route("/admin/stats", get(handlers::stats))
        .route(
            "/admin/files/:id/update-last-accessed",
            post(handlers::update_last_accessed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
