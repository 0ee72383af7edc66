use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Multipart framing allowance on top of the configured upload limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the complete axum Router with all API routes.
pub fn build(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/process", post(handlers::process))
        .route("/api/decrypt", post(handlers::decrypt))
        .route(
            "/api/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/api/sessions/:id", get(handlers::get_session))
        .route("/api/sessions/:id/document", get(handlers::get_document))
        .route("/api/sessions/:id/verify-key", post(handlers::verify_key))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
