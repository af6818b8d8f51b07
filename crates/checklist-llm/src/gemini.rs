//! Google Gemini completion backend.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::traits::{
    BackendConfig, Completion, CompletionRequest, CompletionResponse, TokenUsage,
};
use checklist_core::types::MessageRole;

use crate::http::{api_key, JsonClient};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the config names none.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Gemini backend. The key travels as a query parameter, so it is kept
/// wrapped until the URL is built.
pub struct GeminiCompletion {
    http: JsonClient,
    config: BackendConfig,
    api_key: Secret<String>,
    base_url: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiCompletion {
    /// Create a new Gemini backend.
    pub fn new(config: BackendConfig) -> ChecklistResult<Self> {
        let key = api_key(config.api_key.as_deref(), "GEMINI_API_KEY", "Gemini")?;
        let http = JsonClient::new("Gemini", HeaderMap::new(), config.retry.clone())?;

        let base = config.base_url.as_deref().unwrap_or(GEMINI_API_URL);
        let base_url = Url::parse(&format!("{}/", base.trim_end_matches('/')))
            .map_err(|e| ChecklistError::Configuration(format!("Invalid Gemini URL: {}", e)))?;

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            http,
            config,
            api_key: Secret::new(key),
            base_url,
        })
    }

    fn endpoint(&self, model: &str) -> ChecklistResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", model))
            .map_err(|e| ChecklistError::Configuration(format!("Invalid Gemini model {}: {}", model, e)))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    fn generate_request<'a>(&self, request: &'a CompletionRequest) -> GenerateRequest<'a> {
        let system_parts: Vec<Part<'a>> = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| Part { text: &m.content })
            .collect();

        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| Content {
                role: Some(match m.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                }),
                parts: vec![Part { text: &m.content }],
            })
            .collect();

        GenerateRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then_some(Content {
                role: None,
                parts: system_parts,
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                top_p: request.top_p.unwrap_or(self.config.top_p),
                max_output_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            },
        }
    }
}

#[async_trait]
impl Completion for GeminiCompletion {
    async fn complete(&self, request: &CompletionRequest) -> ChecklistResult<CompletionResponse> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let url = self.endpoint(model)?;
        let body = self.generate_request(request);

        let response: GenerateResponse = self.http.post(url.as_str(), &body).await?;

        let content: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ChecklistError::invalid_response("Gemini returned no candidates"));
        }
        debug!(model, chars = content.len(), "Gemini response received");

        Ok(CompletionResponse {
            content,
            model: model.to_string(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(base_url: String) -> GeminiCompletion {
        GeminiCompletion::new(BackendConfig {
            api_key: Some("g-key".into()),
            base_url: Some(base_url),
            retry: RetryPolicy::none(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_carries_model_and_key() {
        let backend = backend(GEMINI_API_URL.to_string());
        let url = backend.endpoint(DEFAULT_MODEL).unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent?key=g-key"
        );
    }

    #[test]
    fn test_request_shape() {
        let backend = backend(GEMINI_API_URL.to_string());
        let request = CompletionRequest::new(vec![Message::system("sys"), Message::user("doc")])
            .with_sampling(100, 0.3, 0.8);
        let body = serde_json::to_value(backend.generate_request(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
    }

    #[tokio::test]
    async fn test_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .and(query_param("key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "[\"a\","}, {"text": " \"b\"]"}]}}],
                "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
            })))
            .mount(&server)
            .await;

        let response = tokio_test::assert_ok!(
            backend(server.uri())
                .complete(&CompletionRequest::new(vec![Message::user("doc")]).with_model("gemini-pro"))
                .await
        );
        assert_eq!(response.content, r#"["a", "b"]"#);
        assert_eq!(response.model, "gemini-pro");
    }

    #[tokio::test]
    async fn test_bad_key_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid"}
            })))
            .mount(&server)
            .await;

        let err = backend(server.uri())
            .complete(&CompletionRequest::new(vec![Message::user("doc")]))
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
