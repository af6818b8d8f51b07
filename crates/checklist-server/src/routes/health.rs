//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use checklist_core::config::ExtractionMode;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Mode used when an upload names none.
    pub extraction_mode: ExtractionMode,
    pub ai_enabled: bool,
    /// Models AI extraction tries, primary first.
    pub models: Vec<String>,
    pub supported_formats: Vec<String>,
}

/// Service status and what uploads can expect.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        extraction_mode: state.pipeline.config().extraction.mode,
        ai_enabled: state.ai_enabled(),
        models: state.pipeline.model_chain().to_vec(),
        supported_formats: state
            .readers
            .supported_extensions()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }))
}
