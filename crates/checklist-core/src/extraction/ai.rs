//! AI-assisted extraction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::placeholders;
use super::prompts::{
    enhance_prompt, extraction_system_prompt, extraction_user_prompt, truncate_content,
};
use super::validate::finalize;
use crate::config::AiConfig;
use crate::error::{ChecklistError, ChecklistResult};
use crate::normalizer::{normalize_value, Expected};
use crate::traits::{Completion, CompletionRequest, CompletionResponse};
use crate::types::{ChecklistItem, ItemType, Message};

/// Longest raw response prefix written to debug logs.
const PREVIEW_CHARS: usize = 1000;

/// Extracts checklist items by prompting a completion backend.
///
/// [`extract`](Self::extract) never fails: any error becomes a placeholder
/// item. [`try_extract`](Self::try_extract) surfaces the error instead, for
/// callers with their own fallback.
pub struct AiExtractor {
    completion: Arc<dyn Completion>,
    config: AiConfig,
}

impl AiExtractor {
    pub fn new(completion: Arc<dyn Completion>, config: AiConfig) -> Self {
        Self { completion, config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Extract items, converting any failure into placeholder items.
    pub async fn extract(&self, text: &str, file_name: &str) -> Vec<ChecklistItem> {
        self.extract_with_cancel(text, file_name, &CancellationToken::new())
            .await
    }

    /// [`extract`](Self::extract) with caller-controlled cancellation.
    pub async fn extract_with_cancel(
        &self,
        text: &str,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Vec<ChecklistItem> {
        match self.try_extract(text, file_name, cancel).await {
            Ok(items) => items,
            Err(e) => failure_items(&e, text),
        }
    }

    /// Extract items, returning the error on failure.
    pub async fn try_extract(
        &self,
        text: &str,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> ChecklistResult<Vec<ChecklistItem>> {
        let content = truncate_content(text, self.config.content_ceiling);
        if content.len() != text.len() {
            warn!(
                chars = text.chars().count(),
                ceiling = self.config.content_ceiling,
                "Document exceeds content ceiling, truncating"
            );
        }

        let request = self.request(vec![
            Message::system(extraction_system_prompt()),
            Message::user(extraction_user_prompt(
                file_name,
                &content,
                self.config.max_items,
            )),
        ]);

        info!(file = file_name, "Requesting AI extraction");
        let response = self.call(&request, cancel).await?;
        debug!(
            model = %response.model,
            preview = %preview(&response.content),
            "Raw extraction response"
        );

        let value = normalize_value(&response.content, Expected::Array)?;
        let items = parse_items(&value);
        if items.is_empty() {
            warn!(model = %response.model, "Model returned an empty checklist");
            return Ok(vec![placeholders::no_items_found()]);
        }

        let items = finalize(items);
        info!(items = items.len(), model = %response.model, "AI extraction complete");
        Ok(items)
    }

    /// Ask the backend to improve an existing checklist.
    ///
    /// Returns the input unchanged on any failure or an empty result.
    pub async fn enhance(&self, items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
        if items.is_empty() {
            return items;
        }
        let checklist = match serde_json::to_string_pretty(&items) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize checklist for enhancement");
                return items;
            }
        };

        let request = self.request(vec![Message::user(enhance_prompt(&checklist))]);
        let enhanced = async {
            let response = self.call(&request, &CancellationToken::new()).await?;
            debug!(preview = %preview(&response.content), "Raw enhancement response");
            normalize_value(&response.content, Expected::Array).map(|value| parse_items(&value))
        }
        .await;

        match enhanced {
            Ok(parsed) if !parsed.is_empty() => {
                info!(before = items.len(), after = parsed.len(), "Checklist enhanced");
                finalize(parsed)
            }
            Ok(_) => {
                warn!("Enhancement returned no items, keeping the original checklist");
                items
            }
            Err(e) => {
                warn!(error = %e, "Enhancement failed, keeping the original checklist");
                items
            }
        }
    }

    fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest::new(messages).with_sampling(
            self.config.max_tokens,
            self.config.temperature,
            self.config.top_p,
        )
    }

    async fn call(
        &self,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> ChecklistResult<CompletionResponse> {
        let seconds = self.config.timeout_secs;
        let deadline = Duration::from_secs(seconds);
        tokio::select! {
            _ = cancel.cancelled() => Err(ChecklistError::Cancelled),
            result = tokio::time::timeout(deadline, self.completion.complete(request)) => {
                result.map_err(|_| ChecklistError::Timeout { seconds })?
            }
        }
    }
}

/// Placeholder items standing in for a failed AI extraction.
pub(crate) fn failure_items(error: &ChecklistError, text: &str) -> Vec<ChecklistItem> {
    if error.is_rate_limit() {
        warn!(error = %error, "AI extraction rate limited");
        vec![placeholders::rate_limit_error()]
    } else if matches!(error, ChecklistError::AllModelsFailed { .. }) {
        warn!(error = %error, "All models failed, building a basic checklist");
        placeholders::basic_fallback(text)
    } else {
        warn!(error = %error, "AI extraction failed");
        vec![placeholders::ai_conversion_error(&error.to_string())]
    }
}

fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

/// Read a normalized JSON array into items, tolerating loose field names,
/// type synonyms and bare strings.
pub fn parse_items(value: &Value) -> Vec<ChecklistItem> {
    let Some(elements) = value.as_array() else {
        return Vec::new();
    };
    elements
        .iter()
        .enumerate()
        .filter_map(|(i, element)| match element {
            Value::String(text) if !text.trim().is_empty() => Some(
                ChecklistItem::new(format!("item_{:03}", i + 1), text.trim(), ItemType::AI_DEFAULT)
                    .with_description(format!("Extracted from document: {}", text.trim())),
            ),
            Value::Object(map) => Some(parse_object(map)),
            _ => None,
        })
        .collect()
}

fn parse_object(map: &serde_json::Map<String, Value>) -> ChecklistItem {
    let fields: HashMap<String, &Value> = map
        .iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect();
    let field = |names: &[&str]| names.iter().find_map(|n| fields.get(*n).copied());

    let id = field(&["id"]).map(scalar_text).unwrap_or_default();
    let text = field(&["text", "title", "question"])
        .map(scalar_text)
        .unwrap_or_default();
    let item_type = field(&["type"])
        .map(|v| ItemType::from_json(v, ItemType::AI_DEFAULT))
        .unwrap_or(ItemType::AI_DEFAULT);
    let is_required = field(&["isrequired", "is_required", "required"])
        .map(truthy)
        .unwrap_or(false);
    let options = match field(&["options", "choices"]) {
        Some(Value::Array(list)) => list
            .iter()
            .map(scalar_text)
            .filter(|o| !o.is_empty())
            .collect(),
        _ => Vec::new(),
    };

    let mut item = ChecklistItem::new(id, text, item_type)
        .with_required(is_required)
        .with_options(options);
    if let Some(description) = field(&["description"]).map(scalar_text) {
        item = item.with_description(description);
    }
    item
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}
