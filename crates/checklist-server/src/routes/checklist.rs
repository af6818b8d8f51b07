//! Checklist endpoints.

use std::str::FromStr;

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use checklist_core::config::ExtractionMode;
use checklist_core::error::ChecklistError;
use checklist_core::extraction::{finalize, placeholders};
use checklist_core::types::{ChecklistItem, FormSchema, ItemType};
use checklist_readers::ReadError;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for uploads.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// `rules`, `ai` or `auto`; the configured mode when absent.
    pub mode: Option<String>,
}

/// Response for an uploaded document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub item_count: usize,
    pub survey_js: FormSchema,
    pub items: Vec<ChecklistItem>,
    pub has_issues: bool,
    pub message: String,
}

/// Convert an uploaded document into a survey.
/// POST /api/checklist/upload
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mode = query
        .mode
        .as_deref()
        .map(|m| {
            ExtractionMode::from_str(m).map_err(|_| {
                ApiError::bad_request(format!(
                    "Unknown extraction mode '{}'. Use rules, ai or auto.",
                    m
                ))
            })
        })
        .transpose()?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    if state.readers.route(&file_name, &bytes).is_none() {
        return Err(ChecklistError::from(ReadError::UnsupportedFormat(file_name)).into());
    }

    let outcome = state.pipeline.run(&bytes, &file_name, mode).await;
    info!(
        file = %file_name,
        items = outcome.items.len(),
        has_issues = outcome.has_issues,
        "Upload processed"
    );

    let message = if outcome.has_issues {
        "Document processed with some limitations. See generated items for details."
    } else {
        "Successfully processed document."
    };

    Ok(Json(UploadResponse {
        success: true,
        file_name,
        item_count: outcome.items.len(),
        survey_js: outcome.schema,
        items: outcome.items,
        has_issues: outcome.has_issues,
        message: message.to_string(),
    }))
}

/// Request body for compiling items.
#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Compile checklist items into a survey.
/// POST /api/checklist/compile
pub async fn compile(
    State(state): State<AppState>,
    Json(request): Json<CompileRequest>,
) -> ApiResult<Json<FormSchema>> {
    let mut items = finalize(request.items);
    if items.is_empty() {
        items.push(placeholders::no_items_found());
    }
    let title = request.title.unwrap_or_default();
    Ok(Json(state.pipeline.compiler().compile(&items, &title)))
}

/// Response carrying only a survey.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResponse {
    pub success: bool,
    pub survey_js: FormSchema,
}

/// Items behind the sample survey.
pub fn sample_items() -> Vec<ChecklistItem> {
    vec![
        ChecklistItem::new("sample_1", "What is your company name?", ItemType::Text)
            .with_required(true),
        ChecklistItem::new("sample_2", "Do you have regulatory approval?", ItemType::Boolean)
            .with_required(true),
        ChecklistItem::new("sample_3", "Select your company type:", ItemType::RadioGroup)
            .with_options(vec!["UCITS".into(), "AIF".into(), "Other".into()])
            .with_required(true),
    ]
}

/// Sample survey for trying the form renderer.
/// GET /api/checklist/sample
pub async fn sample(State(state): State<AppState>) -> ApiResult<Json<SampleResponse>> {
    Ok(Json(SampleResponse {
        success: true,
        survey_js: state
            .pipeline
            .compiler()
            .compile(&sample_items(), "Sample Survey"),
    }))
}

/// Request body for saving survey answers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultsRequest {
    #[serde(default)]
    pub survey_data: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Response for saved survey answers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultsResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
    pub timestamp: String,
}

fn is_empty_submission(data: &serde_json::Value) -> bool {
    match data {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(list) => list.is_empty(),
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Accept survey answers. Submissions are logged, not stored.
/// POST /api/checklist/saveResults
pub async fn save_results(
    Json(request): Json<SaveResultsRequest>,
) -> ApiResult<Json<SaveResultsResponse>> {
    if is_empty_submission(&request.survey_data) {
        return Err(ApiError::bad_request("No survey data provided"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    info!(id = %id, "Survey results received");
    debug!(id = %id, data = %request.survey_data, "Survey data");

    Ok(Json(SaveResultsResponse {
        success: true,
        id,
        message: "Survey results saved successfully".to_string(),
        timestamp: request
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    }))
}
