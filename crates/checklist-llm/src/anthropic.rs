//! Anthropic (Claude) completion backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::traits::{
    BackendConfig, Completion, CompletionRequest, CompletionResponse, TokenUsage,
};
use checklist_core::types::MessageRole;

use crate::http::{api_key, headers, JsonClient};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used when the config names none.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Anthropic backend.
pub struct AnthropicCompletion {
    http: JsonClient,
    config: BackendConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: Option<String>,
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicCompletion {
    /// Create a new Anthropic backend.
    pub fn new(config: BackendConfig) -> ChecklistResult<Self> {
        let key = api_key(config.api_key.as_deref(), "ANTHROPIC_API_KEY", "Anthropic")?;
        let headers = headers(&[
            ("x-api-key", key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
        ])?;
        let http = JsonClient::new("Anthropic", headers, config.retry.clone())?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| ANTHROPIC_API_URL.to_string())
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

    fn anthropic_request<'a>(&'a self, request: &'a CompletionRequest) -> AnthropicRequest<'a> {
        // System prompts travel in their own field.
        let system = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let messages = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| AnthropicMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();

        AnthropicRequest {
            model: request.model.as_deref().unwrap_or(&self.config.model),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            top_p: request.top_p.unwrap_or(self.config.top_p),
            system: (!system.is_empty()).then_some(system),
            messages,
        }
    }
}

#[async_trait]
impl Completion for AnthropicCompletion {
    async fn complete(&self, request: &CompletionRequest) -> ChecklistResult<CompletionResponse> {
        let body = self.anthropic_request(request);
        let response: AnthropicResponse = self
            .http
            .post(&format!("{}/messages", self.base_url), &body)
            .await?;

        let content = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<String>();
        if content.trim().is_empty() {
            return Err(ChecklistError::invalid_response("Anthropic returned no text content"));
        }

        let model = response.model.unwrap_or_else(|| body.model.to_string());
        debug!(model = %model, chars = content.len(), "Anthropic response received");

        Ok(CompletionResponse {
            content,
            model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::traits::RetryPolicy;
    use checklist_core::types::Message;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(base_url: String) -> AnthropicCompletion {
        AnthropicCompletion::new(BackendConfig {
            api_key: Some("ak-test".into()),
            base_url: Some(base_url),
            retry: RetryPolicy::none(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_system_prompt_is_lifted() {
        let backend = backend("http://localhost".into());
        let request = CompletionRequest::new(vec![
            Message::system("Be terse."),
            Message::user("Extract."),
        ]);
        let body = backend.anthropic_request(&request);
        assert_eq!(body.system.as_deref(), Some("Be terse."));
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_messages_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "ak-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({"system": "sys"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "claude-test",
                "content": [{"type": "text", "text": "[{\"id\": \"a\"}]"}],
                "usage": {"input_tokens": 10, "output_tokens": 4}
            })))
            .mount(&server)
            .await;

        let response = backend(server.uri())
            .complete(&CompletionRequest::new(vec![
                Message::system("sys"),
                Message::user("doc"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.model, "claude-test");
        assert_eq!(response.usage.unwrap().total_tokens, 14);
    }

    #[tokio::test]
    async fn test_overloaded_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_json(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            })))
            .mount(&server)
            .await;

        let err = backend(server.uri())
            .complete(&CompletionRequest::new(vec![Message::user("doc")]))
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
