//! Completion trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChecklistResult;
use crate::types::Message;

/// A single chat-style completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Prompt messages, system first.
    pub messages: Vec<Message>,
    /// Model override. `None` uses the backend's configured model.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    /// Create a request with the given messages and backend defaults.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }

    /// Route the request to a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling parameters.
    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32, top_p: f32) -> Self {
        self.max_tokens = Some(max_tokens);
        self.temperature = Some(temperature);
        self.top_p = Some(top_p);
        self
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens.
    pub total_tokens: u32,
}

/// Raw text returned by a completion backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    /// Model that actually produced the content.
    pub model: String,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: None,
        }
    }
}

/// Core completion trait. Every backend and the fallback chain implement this.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Completion: Send + Sync {
    /// Send a prompt and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> ChecklistResult<CompletionResponse>;

    /// Configured default model.
    fn model_name(&self) -> &str;
}

/// Per-model retry policy for transient HTTP failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// First delay in milliseconds; later delays grow exponentially.
    pub min_delay_ms: u64,
    /// Cap on a single delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Backend connection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Model name/identifier. Empty uses the provider default.
    #[serde(default)]
    pub model: String,
    /// API key (if not using environment variable).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for the API, or the Azure resource endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Value for the `HTTP-Referer` header on OpenRouter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Value for the `X-Title` header on OpenRouter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
    /// Azure OpenAI API version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.95
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            referer: None,
            app_title: None,
            api_version: None,
            retry: RetryPolicy::default(),
        }
    }
}
