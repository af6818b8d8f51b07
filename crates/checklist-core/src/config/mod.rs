//! Configuration system for checklist extraction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use strum::{Display, EnumString};

use crate::error::{ChecklistError, ChecklistResult};
use crate::traits::BackendConfig;
use crate::types::FormSettings;

/// How the pipeline turns document text into items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExtractionMode {
    /// Pattern rules only.
    Rules,
    /// Completion backend only.
    Ai,
    /// Backend when configured, rules when it yields nothing usable.
    #[default]
    Auto,
}

/// Completion provider type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendProvider {
    #[default]
    OpenRouter,
    Anthropic,
    Gemini,
    #[serde(rename = "azure")]
    #[strum(serialize = "azure", serialize = "azureopenai")]
    AzureOpenAI,
}

impl BackendProvider {
    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            BackendProvider::OpenRouter => "OPENROUTER_API_KEY",
            BackendProvider::Anthropic => "ANTHROPIC_API_KEY",
            BackendProvider::Gemini => "GEMINI_API_KEY",
            BackendProvider::AzureOpenAI => "AZURE_OPENAI_API_KEY",
        }
    }
}

/// Provider configuration with type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProviderConfig {
    /// Provider type.
    pub provider: BackendProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: BackendConfig,
}

impl BackendProviderConfig {
    pub fn new(provider: BackendProvider, config: BackendConfig) -> Self {
        Self { provider, config }
    }
}

/// Rule-based extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
    /// Shortest paragraph considered for an item.
    pub min_paragraph_len: usize,
    /// Shortest line considered for an item in line-oriented sources.
    pub min_line_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Auto,
            min_paragraph_len: 10,
            min_line_len: 3,
        }
    }
}

/// AI-assisted extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Longest document text sent to the backend, in characters.
    pub content_ceiling: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Deadline for one extraction call across the whole fallback chain.
    pub timeout_secs: u64,
    /// Item cap stated in the prompt.
    pub max_items: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            content_ceiling: 50_000,
            max_tokens: 4000,
            temperature: 0.3,
            top_p: 0.8,
            timeout_secs: 300,
            max_items: 50,
        }
    }
}

/// Model fallback chain settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Models tried after the backend's own model, in order.
    pub models: Vec<String>,
    /// Pause before the next model after a rate-limit or unavailable response.
    pub backoff_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            backoff_ms: 2_000,
        }
    }
}

/// Main checklist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChecklistConfig {
    pub extraction: ExtractionConfig,
    pub ai: AiConfig,
    /// Completion backend (optional). Without one, AI extraction is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendProviderConfig>,
    pub fallback: FallbackConfig,
    pub form: FormSettings,
}

impl ChecklistConfig {
    /// Default location of the user config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("checklist-forge"))
            .unwrap_or_else(|| PathBuf::from(".checklist-forge"))
            .join("config.toml")
    }

    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ChecklistResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| ChecklistError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ChecklistError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| ChecklistError::Configuration(e.to_string())),
            _ => Err(ChecklistError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay environment variables on top of this configuration.
    pub fn apply_env(&mut self) {
        if let Some(mode) = env_parse::<ExtractionMode>("CHECKLIST_MODE") {
            self.extraction.mode = mode;
        }

        let provider = env_parse::<BackendProvider>("CHECKLIST_PROVIDER").or_else(|| {
            if self.backend.is_some() {
                return None;
            }
            [
                BackendProvider::OpenRouter,
                BackendProvider::Anthropic,
                BackendProvider::Gemini,
                BackendProvider::AzureOpenAI,
            ]
            .into_iter()
            .find(|p| std::env::var(p.api_key_var()).is_ok())
        });

        if let Some(provider) = provider {
            let mut backend = self
                .backend
                .take()
                .filter(|b| b.provider == provider)
                .unwrap_or_else(|| BackendProviderConfig::new(provider, BackendConfig::default()));
            if let Ok(api_key) = std::env::var(provider.api_key_var()) {
                backend.config.api_key = Some(api_key);
            }
            if provider == BackendProvider::AzureOpenAI {
                if let Ok(endpoint) = std::env::var("AZURE_OPENAI_ENDPOINT") {
                    backend.config.base_url = Some(endpoint);
                }
            }
            self.backend = Some(backend);
        }

        if let (Ok(model), Some(backend)) = (std::env::var("CHECKLIST_MODEL"), self.backend.as_mut())
        {
            backend.config.model = model;
        }

        if let Ok(models) = std::env::var("CHECKLIST_FALLBACK_MODELS") {
            self.fallback.models = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(ms) = env_parse("CHECKLIST_BACKOFF_MS") {
            self.fallback.backoff_ms = ms;
        }
        if let Some(secs) = env_parse("CHECKLIST_TIMEOUT_SECS") {
            self.ai.timeout_secs = secs;
        }
        if let Some(ceiling) = env_parse("CHECKLIST_CONTENT_CEILING") {
            self.ai.content_ceiling = ceiling;
        }
        if let Some(size) = env_parse::<usize>("CHECKLIST_PAGE_SIZE") {
            if size > 0 {
                self.form.page_size = size;
            }
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> ChecklistConfigBuilder {
        ChecklistConfigBuilder::default()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| {
        let parsed = v.trim().parse().ok();
        if parsed.is_none() {
            tracing::warn!(key, value = %v, "Ignoring unparseable environment variable");
        }
        parsed
    })
}

/// Builder for ChecklistConfig.
#[derive(Default)]
pub struct ChecklistConfigBuilder {
    config: ChecklistConfig,
}

impl ChecklistConfigBuilder {
    /// Set extraction mode.
    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.config.extraction.mode = mode;
        self
    }

    /// Set rule-based extraction configuration.
    pub fn extraction(mut self, config: ExtractionConfig) -> Self {
        self.config.extraction = config;
        self
    }

    /// Set AI extraction configuration.
    pub fn ai(mut self, config: AiConfig) -> Self {
        self.config.ai = config;
        self
    }

    /// Set completion backend configuration.
    pub fn backend(mut self, config: BackendProviderConfig) -> Self {
        self.config.backend = Some(config);
        self
    }

    /// Set fallback models.
    pub fn fallback_models(mut self, models: Vec<String>) -> Self {
        self.config.fallback.models = models;
        self
    }

    /// Set backoff between rate-limited models.
    pub fn backoff_ms(mut self, ms: u64) -> Self {
        self.config.fallback.backoff_ms = ms;
        self
    }

    /// Set form settings.
    pub fn form(mut self, settings: FormSettings) -> Self {
        self.config.form = settings;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ChecklistConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ChecklistConfig::default();
        assert_eq!(config.extraction.mode, ExtractionMode::Auto);
        assert_eq!(config.ai.content_ceiling, 50_000);
        assert_eq!(config.ai.timeout_secs, 300);
        assert_eq!(config.fallback.backoff_ms, 2_000);
        assert_eq!(config.form.page_size, 10);
        assert!(config.backend.is_none());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("RULES".parse::<ExtractionMode>().unwrap(), ExtractionMode::Rules);
        assert_eq!("ai".parse::<ExtractionMode>().unwrap(), ExtractionMode::Ai);
        assert!("magic".parse::<ExtractionMode>().is_err());
        assert_eq!(
            "azure".parse::<BackendProvider>().unwrap(),
            BackendProvider::AzureOpenAI
        );
        assert_eq!(
            "openrouter".parse::<BackendProvider>().unwrap(),
            BackendProvider::OpenRouter
        );
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[extraction]
mode = "rules"

[backend]
provider = "anthropic"
model = "claude-3-haiku"

[fallback]
models = ["a", "b"]
backoff_ms = 0
"#
        )
        .unwrap();

        let config = ChecklistConfig::from_file(file.path()).unwrap();
        assert_eq!(config.extraction.mode, ExtractionMode::Rules);
        let backend = config.backend.unwrap();
        assert_eq!(backend.provider, BackendProvider::Anthropic);
        assert_eq!(backend.config.model, "claude-3-haiku");
        assert_eq!(config.fallback.models, vec!["a", "b"]);
        assert_eq!(config.fallback.backoff_ms, 0);
        assert_eq!(config.ai.max_tokens, 4000);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"form": {{"pageSize": 5, "completeText": "Done"}}}}"#).unwrap();

        let config = ChecklistConfig::from_file(file.path()).unwrap();
        assert_eq!(config.form.page_size, 5);
        assert_eq!(config.form.complete_text, "Done");
        assert_eq!(config.form.show_progress_bar, "top");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            ChecklistConfig::from_file(file.path()),
            Err(ChecklistError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = ChecklistConfig::builder()
            .mode(ExtractionMode::Ai)
            .fallback_models(vec!["m".into()])
            .backoff_ms(0)
            .build();
        assert_eq!(config.extraction.mode, ExtractionMode::Ai);
        assert_eq!(config.fallback.models, vec!["m"]);
        assert_eq!(config.fallback.backoff_ms, 0);
    }
}
