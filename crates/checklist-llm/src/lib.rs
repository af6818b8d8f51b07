//! checklist-llm - Completion backends for checklist extraction.
//!
//! Every backend implements [`checklist_core::Completion`]. REST backends
//! retry network failures and 5xx responses on the same model; rate limits
//! and missing models go straight back to the caller's fallback chain.
//!
//! # Supported Providers
//!
//! - **OpenRouter** - free and paid models behind an OpenAI-compatible API
//! - **Anthropic** - Claude via the Messages API
//! - **Gemini** - Google `generateContent`
//! - **Azure OpenAI** (feature: `azure`) - chat deployments via async-openai
//!
//! # Example
//!
//! ```ignore
//! use checklist_llm::CompletionFactory;
//!
//! let backend = CompletionFactory::openrouter_with_model("meta-llama/llama-3.2-3b-instruct:free")?;
//! ```

mod anthropic;
#[cfg(feature = "azure")]
mod azure;
mod factory;
mod gemini;
mod http;
mod openrouter;

pub use anthropic::AnthropicCompletion;
#[cfg(feature = "azure")]
pub use azure::AzureOpenAiCompletion;
pub use factory::{validate, CompletionFactory};
pub use gemini::GeminiCompletion;
pub use openrouter::{OpenRouterCompletion, FREE_FALLBACK_MODELS};

// Re-export core types for convenience
pub use checklist_core::config::BackendProvider;
pub use checklist_core::traits::{BackendConfig, Completion, CompletionRequest, CompletionResponse};
