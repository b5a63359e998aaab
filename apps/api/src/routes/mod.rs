pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ats::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // ATS API
        .route("/api/v1/ats/analyze", post(handlers::handle_analyze_upload))
        .route("/api/v1/ats/analyze-text", post(handlers::handle_analyze_text))
        .route("/api/v1/ats/analyses", get(handlers::handle_list_analyses))
        .route("/api/v1/ats/analyses/:id", get(handlers::handle_get_analysis))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
