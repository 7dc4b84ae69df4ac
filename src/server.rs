use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Remote-write ingest ─────────────────────────────────
        .route("/receive", post(handlers::receive::receive_write))
        // ── Liveness ────────────────────────────────────────────
        .route("/healthz", get(handlers::healthz))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware ───────────────────────────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
}
