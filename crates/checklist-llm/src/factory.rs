//! Factory for creating completion backends.

use std::sync::Arc;

use checklist_core::config::{BackendProvider, BackendProviderConfig};
use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::traits::{BackendConfig, Completion};

use crate::anthropic::AnthropicCompletion;
use crate::gemini::GeminiCompletion;
use crate::openrouter::{OpenRouterCompletion, FREE_FALLBACK_MODELS};

/// Factory for creating completion backends.
pub struct CompletionFactory;

impl CompletionFactory {
    /// Create a backend from the given configuration.
    ///
    /// Fails with `Configuration` when the provider's API key is missing.
    pub fn create(
        provider: BackendProvider,
        config: BackendConfig,
    ) -> ChecklistResult<Arc<dyn Completion>> {
        match provider {
            BackendProvider::OpenRouter => Ok(Arc::new(OpenRouterCompletion::new(config)?)),
            BackendProvider::Anthropic => Ok(Arc::new(AnthropicCompletion::new(config)?)),
            BackendProvider::Gemini => Ok(Arc::new(GeminiCompletion::new(config)?)),
            #[cfg(feature = "azure")]
            BackendProvider::AzureOpenAI => Ok(Arc::new(
                crate::azure::AzureOpenAiCompletion::new(config)?,
            )),
            #[cfg(not(feature = "azure"))]
            BackendProvider::AzureOpenAI => Err(ChecklistError::UnsupportedProvider {
                provider: format!("{} (enable the 'azure' feature)", provider),
            }),
        }
    }

    /// Create a backend from a provider config section.
    pub fn from_config(config: &BackendProviderConfig) -> ChecklistResult<Arc<dyn Completion>> {
        Self::create(config.provider, config.config.clone())
    }

    /// Fallback models to use when none are configured.
    pub fn default_fallback_models(provider: BackendProvider) -> Vec<String> {
        match provider {
            BackendProvider::OpenRouter => {
                FREE_FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Create an OpenRouter backend with a specific model.
    pub fn openrouter_with_model(model: impl Into<String>) -> ChecklistResult<Arc<dyn Completion>> {
        let config = BackendConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(BackendProvider::OpenRouter, config)
    }

    /// Create an Anthropic backend with a specific model.
    pub fn anthropic_with_model(model: impl Into<String>) -> ChecklistResult<Arc<dyn Completion>> {
        let config = BackendConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(BackendProvider::Anthropic, config)
    }
}

/// Reject a provider config that cannot produce a backend, without building one.
pub fn validate(config: &BackendProviderConfig) -> ChecklistResult<()> {
    CompletionFactory::from_config(config).map(|_| ()).map_err(|e| match e {
        ChecklistError::Configuration(msg) => {
            ChecklistError::Configuration(format!("{}: {}", config.provider, msg))
        }
        other => other,
    })
}
