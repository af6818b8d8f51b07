//! checklist-core - Core library for checklist extraction.
//!
//! This crate turns document text into checklist items and compiles those
//! items into survey form definitions. Document parsing and completion
//! backends live in sibling crates and plug in through the
//! [`DocumentReader`] and [`Completion`] traits.
//!
//! # Example
//!
//! ```ignore
//! use checklist_core::{ChecklistConfig, ChecklistPipeline};
//!
//! let pipeline = ChecklistPipeline::new(ChecklistConfig::from_env())
//!     .with_readers(readers)
//!     .with_completion(backend);
//!
//! let outcome = pipeline.run(&bytes, "checklist.docx", None).await;
//! println!("{}", outcome.schema.to_json_pretty()?);
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fallback;
pub mod normalizer;
pub mod pipeline;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use compiler::FormCompiler;
pub use config::{
    AiConfig, BackendProvider, BackendProviderConfig, ChecklistConfig, ExtractionConfig,
    ExtractionMode, FallbackConfig,
};
pub use error::{ChecklistError, ChecklistResult, ErrorCode};
pub use extraction::{AiExtractor, ExtractionEngine};
pub use fallback::FallbackCompletion;
pub use normalizer::{normalize, normalize_value, Expected};
pub use pipeline::{ChecklistPipeline, PipelineOutcome, PipelineStage, PipelineState};
pub use traits::{
    BackendConfig, Completion, CompletionRequest, CompletionResponse, DocumentReader,
    RetryPolicy,
};
pub use types::{
    BlockKind, ChecklistItem, Choice, ElementType, FormElement, FormPage, FormSchema,
    FormSettings, ItemType, Message, MessageRole, TextBlock,
};
