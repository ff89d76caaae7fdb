//! HTTP surface for the compliance posture engine
//!
//! Thin wrappers only: every route delegates to the engine façade, which
//! owns all synchronization and invariants.

pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use posture_engine::PostureEngine;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state
pub type ApiState = Arc<PostureEngine>;

/// Build the API router
pub fn build_router(engine: ApiState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
