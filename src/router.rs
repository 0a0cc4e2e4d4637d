use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// All routes of the app:
/// - `GET /` -- landing page
/// - `GET /request-token` -- start signing in
/// - `GET /response` -- OAuth callback landing page
/// - `GET /access-token` -- finish signing in and show the profile
/// - `GET /health` -- liveness probe
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/request-token", get(handlers::request_token))
        .route("/response", get(handlers::response))
        .route("/access-token", get(handlers::access_token))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
