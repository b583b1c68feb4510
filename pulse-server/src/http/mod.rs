//! HTTP server module

mod api;
mod static_files;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{AppState, ws};

pub use api::{ConnectionCounts, HealthResponse};
pub use static_files::content_type_for;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/socket.io/:namespace", get(ws::namespace_ws))
        .route("/", get(static_files::index))
        .route("/static/*path", get(static_files::static_asset))
        .fallback(static_files::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
