//! Route definitions for the REST API.

mod checklist;
mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Checklist operations
        .route("/api/checklist/upload", post(checklist::upload))
        .route("/api/checklist/compile", post(checklist::compile))
        .route("/api/checklist/sample", get(checklist::sample))
        .route("/api/checklist/saveResults", post(checklist::save_results))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Attach state
        .with_state(state)
}

pub use checklist::*;
pub use health::*;
