//! Builds the checklist pipeline from configuration.

use checklist_core::config::{BackendProvider, ChecklistConfig, ExtractionMode};
use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::pipeline::ChecklistPipeline;
use checklist_llm::CompletionFactory;
use checklist_readers::ReaderRegistry;
use tracing::info;

/// Create a pipeline with every reader and, when configured, a completion backend.
///
/// OpenRouter gets the free model list as its fallback chain when none is configured.
pub fn create_pipeline(
    mut config: ChecklistConfig,
    readers: &ReaderRegistry,
) -> ChecklistResult<ChecklistPipeline> {
    let completion = match &config.backend {
        Some(backend) => {
            if backend.provider == BackendProvider::OpenRouter && config.fallback.models.is_empty()
            {
                config.fallback.models = CompletionFactory::default_fallback_models(backend.provider);
            }
            let completion = CompletionFactory::from_config(backend)?;
            info!(
                provider = %backend.provider,
                model = completion.model_name(),
                fallbacks = config.fallback.models.len(),
                "Completion backend ready"
            );
            Some(completion)
        }
        None if config.extraction.mode == ExtractionMode::Ai => {
            return Err(ChecklistError::Configuration(
                "Extraction mode 'ai' needs a backend. Set CHECKLIST_PROVIDER or [backend] in config."
                    .to_string(),
            ));
        }
        None => {
            info!("No completion backend configured; using rule-based extraction");
            None
        }
    };

    let pipeline = ChecklistPipeline::new(config).with_readers(readers.readers().to_vec());
    Ok(match completion {
        Some(completion) => pipeline.with_completion(completion),
        None => pipeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::config::BackendProviderConfig;
    use checklist_core::traits::BackendConfig;

    #[test]
    fn test_rules_only_pipeline() {
        let pipeline = create_pipeline(ChecklistConfig::default(), &ReaderRegistry::with_defaults())
            .unwrap();
        assert!(!pipeline.has_ai());
    }

    #[test]
    fn test_ai_mode_without_backend_fails_fast() {
        let config = ChecklistConfig::builder().mode(ExtractionMode::Ai).build();
        let err = create_pipeline(config, &ReaderRegistry::new()).err().unwrap();
        assert!(matches!(err, ChecklistError::Configuration(_)));
    }

    #[test]
    fn test_openrouter_gets_free_fallbacks() {
        let config = ChecklistConfig::builder()
            .backend(BackendProviderConfig::new(
                BackendProvider::OpenRouter,
                BackendConfig {
                    api_key: Some("sk-test".into()),
                    ..Default::default()
                },
            ))
            .build();
        let pipeline = create_pipeline(config, &ReaderRegistry::new()).unwrap();
        assert!(pipeline.has_ai());
        assert_eq!(pipeline.config().fallback.models.len(), 5);
    }
}
