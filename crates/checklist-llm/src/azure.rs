//! Azure OpenAI completion backend.

use async_trait::async_trait;
use tracing::debug;

use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::traits::{
    BackendConfig, Completion, CompletionRequest, CompletionResponse, TokenUsage,
};
use checklist_core::types::{Message, MessageRole};

use async_openai::{
    config::AzureConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
    Client,
};

use crate::http::api_key;

/// API version used when the config names none.
pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Azure OpenAI backend. The model name is the deployment id.
pub struct AzureOpenAiCompletion {
    azure: AzureConfig,
    client: Client<AzureConfig>,
    config: BackendConfig,
}

impl AzureOpenAiCompletion {
    /// Create a new Azure OpenAI backend.
    ///
    /// The endpoint comes from `base_url` or `AZURE_OPENAI_ENDPOINT`.
    pub fn new(config: BackendConfig) -> ChecklistResult<Self> {
        let key = api_key(config.api_key.as_deref(), "AZURE_OPENAI_API_KEY", "Azure OpenAI")?;
        let endpoint = config
            .base_url
            .clone()
            .or_else(|| std::env::var("AZURE_OPENAI_ENDPOINT").ok())
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                ChecklistError::Configuration(
                    "Azure OpenAI endpoint not found. Set AZURE_OPENAI_ENDPOINT or provide base_url in config."
                        .to_string(),
                )
            })?;
        if config.model.is_empty() {
            return Err(ChecklistError::Configuration(
                "Azure OpenAI needs a deployment name in model".to_string(),
            ));
        }

        let azure = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_key(key)
            .with_api_version(
                config
                    .api_version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            )
            .with_deployment_id(config.model.clone());
        let client = Client::with_config(azure.clone());

        Ok(Self {
            azure,
            client,
            config,
        })
    }

    fn message_to_openai(msg: &Message) -> ChatCompletionRequestMessage {
        match msg.role {
            MessageRole::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            MessageRole::User => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                    name: None,
                })
            }
            MessageRole::Assistant => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                        msg.content.clone(),
                    )),
                    ..Default::default()
                })
            }
        }
    }
}

/// Map client errors onto the shared taxonomy.
fn classify(error: OpenAIError, deployment: &str) -> ChecklistError {
    match error {
        OpenAIError::Reqwest(e) => {
            ChecklistError::network(format!("Azure OpenAI request failed: {}", e))
        }
        OpenAIError::ApiError(api) => {
            let message = api.message.clone();
            let lower = message.to_lowercase();
            if lower.contains("access denied")
                || lower.contains("subscription key")
                || lower.contains("api key")
            {
                ChecklistError::authentication(message)
            } else if lower.contains("deploymentnotfound")
                || (lower.contains("deployment") && lower.contains("not exist"))
            {
                ChecklistError::model_unavailable(deployment, message)
            } else {
                ChecklistError::from_http_status(0, &message)
            }
        }
        OpenAIError::JSONDeserialize(e) => {
            ChecklistError::backend(format!("Failed to parse Azure OpenAI response: {}", e))
        }
        other => ChecklistError::backend(format!("Azure OpenAI error: {}", other)),
    }
}

#[async_trait]
impl Completion for AzureOpenAiCompletion {
    async fn complete(&self, request: &CompletionRequest) -> ChecklistResult<CompletionResponse> {
        let deployment = request.model.as_deref().unwrap_or(&self.config.model);

        let chat = CreateChatCompletionRequest {
            model: deployment.to_string(),
            messages: request.messages.iter().map(Self::message_to_openai).collect(),
            max_tokens: Some(request.max_tokens.unwrap_or(self.config.max_tokens)),
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
            top_p: Some(request.top_p.unwrap_or(self.config.top_p)),
            ..Default::default()
        };

        // Each deployment has its own URL.
        let result = if deployment == self.config.model {
            self.client.chat().create(chat).await
        } else {
            Client::with_config(self.azure.clone().with_deployment_id(deployment))
                .chat()
                .create(chat)
                .await
        };
        let response = result.map_err(|e| classify(e, deployment))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ChecklistError::invalid_response("Azure OpenAI returned no content"))?;
        debug!(deployment, chars = content.len(), "Azure OpenAI response received");

        Ok(CompletionResponse {
            content,
            model: deployment.to_string(),
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
