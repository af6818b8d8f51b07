//! OpenRouter completion backend (OpenAI-compatible chat completions).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::traits::{
    BackendConfig, Completion, CompletionRequest, CompletionResponse, TokenUsage,
};
use checklist_core::types::Message;

use crate::http::{api_key, headers, JsonClient};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when the config names none.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.2-3b-instruct:free";

/// Free-tier models tried after the primary, in order of preference.
pub const FREE_FALLBACK_MODELS: &[&str] = &[
    "mistralai/mistral-7b-instruct:free",
    "openchat/openchat-7b:free",
    "huggingfaceh4/zephyr-7b-beta:free",
    "google/gemma-7b-it:free",
    "meta-llama/llama-3.2-1b-instruct:free",
];

const DEFAULT_APP_TITLE: &str = "Checklist Generator";

/// OpenRouter backend.
pub struct OpenRouterCompletion {
    http: JsonClient,
    config: BackendConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    /// OpenRouter reports some upstream failures inside a 200 response.
    #[serde(default)]
    error: Option<ChatError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    #[serde(default)]
    code: Option<u16>,
    message: String,
}

impl OpenRouterCompletion {
    /// Create a new OpenRouter backend.
    pub fn new(config: BackendConfig) -> ChecklistResult<Self> {
        let key = api_key(config.api_key.as_deref(), "OPENROUTER_API_KEY", "OpenRouter")?;
        let bearer = format!("Bearer {}", key);
        let mut pairs = vec![
            ("authorization", bearer.as_str()),
            (
                "x-title",
                config.app_title.as_deref().unwrap_or(DEFAULT_APP_TITLE),
            ),
        ];
        if let Some(referer) = config.referer.as_deref() {
            pairs.push(("http-referer", referer));
        }
        let http = JsonClient::new("OpenRouter", headers(&pairs)?, config.retry.clone())?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENROUTER_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    fn chat_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: request.model.as_deref().unwrap_or(&self.config.model),
            messages: request.messages.iter().map(chat_message).collect(),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            top_p: request.top_p.unwrap_or(self.config.top_p),
        }
    }
}

fn chat_message(message: &Message) -> ChatMessage<'_> {
    ChatMessage {
        role: message.role.as_str(),
        content: &message.content,
    }
}

#[async_trait]
impl Completion for OpenRouterCompletion {
    async fn complete(&self, request: &CompletionRequest) -> ChecklistResult<CompletionResponse> {
        let body = self.chat_request(request);
        let chars: usize = request.messages.iter().map(|m| m.content.len()).sum();
        info!(model = body.model, chars, "Sending OpenRouter request");

        let response: ChatResponse = self
            .http
            .post(&format!("{}/chat/completions", self.base_url), &body)
            .await?;

        if let Some(error) = response.error {
            return Err(ChecklistError::from_http_status(
                error.code.unwrap_or(500),
                &error.message,
            ));
        }

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ChecklistError::invalid_response("OpenRouter returned no content"))?;

        let model = response.model.unwrap_or_else(|| body.model.to_string());
        debug!(model = %model, chars = content.len(), "OpenRouter response received");

        Ok(CompletionResponse {
            content,
            model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
