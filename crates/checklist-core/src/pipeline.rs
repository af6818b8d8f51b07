//! End-to-end document processing.
//!
//! A run moves through `ReadingDocument -> Extracting -> Compiling -> Done`.
//! Every run reaches compilation: read and extraction failures turn into
//! placeholder items, and the final state records where the failure happened.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::compiler::{FormCompiler, DEFAULT_TITLE};
use crate::config::{ChecklistConfig, ExtractionMode};
use crate::error::{ChecklistError, ChecklistResult};
use crate::extraction::{failure_items, placeholders, AiExtractor, ExtractionEngine};
use crate::fallback::FallbackCompletion;
use crate::traits::{route_reader, Completion, DocumentReader};
use crate::types::{blocks_to_text, ChecklistItem, FormSchema, TextBlock};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PipelineStage {
    ReadingDocument,
    Extracting,
    Compiling,
}

/// Where a run ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum PipelineState {
    Done,
    /// A stage failed; later stages still ran on placeholder items.
    Failed { stage: PipelineStage },
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub items: Vec<ChecklistItem>,
    pub schema: FormSchema,
    /// Stages entered, in order.
    pub stages: Vec<PipelineStage>,
    pub state: PipelineState,
    /// Whether any item reports a processing problem.
    pub has_issues: bool,
}

/// Reads, extracts and compiles documents.
pub struct ChecklistPipeline {
    readers: Vec<Arc<dyn DocumentReader>>,
    engine: ExtractionEngine,
    ai: Option<AiExtractor>,
    compiler: FormCompiler,
    config: ChecklistConfig,
    /// Models the AI extractor tries, in order.
    model_chain: Vec<String>,
}

impl ChecklistPipeline {
    /// A pipeline without readers or a completion backend.
    pub fn new(config: ChecklistConfig) -> Self {
        Self {
            readers: Vec::new(),
            engine: ExtractionEngine::new(config.extraction.clone()),
            ai: None,
            compiler: FormCompiler::new(config.form.clone()),
            config,
            model_chain: Vec::new(),
        }
    }

    pub fn with_readers(mut self, readers: Vec<Arc<dyn DocumentReader>>) -> Self {
        self.readers = readers;
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn DocumentReader>) -> Self {
        self.readers.push(reader);
        self
    }

    /// Enable AI extraction through `completion`, wrapped in the configured
    /// model fallback chain.
    pub fn with_completion(mut self, completion: Arc<dyn Completion>) -> Self {
        let chain = FallbackCompletion::new(completion, &self.config.fallback);
        self.model_chain = chain.models().to_vec();
        let extractor = AiExtractor::new(Arc::new(chain), self.config.ai.clone());
        self.with_ai_extractor(extractor)
    }

    pub fn with_ai_extractor(mut self, extractor: AiExtractor) -> Self {
        self.ai = Some(extractor);
        self
    }

    pub fn config(&self) -> &ChecklistConfig {
        &self.config
    }

    pub fn compiler(&self) -> &FormCompiler {
        &self.compiler
    }

    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Models behind AI extraction, primary first. Empty unless built with
    /// [`with_completion`](Self::with_completion).
    pub fn model_chain(&self) -> &[String] {
        &self.model_chain
    }

    /// Process a document. `mode` overrides the configured extraction mode.
    pub async fn run(
        &self,
        content: &[u8],
        file_name: &str,
        mode: Option<ExtractionMode>,
    ) -> PipelineOutcome {
        self.run_with_cancel(content, file_name, mode, &CancellationToken::new())
            .await
    }

    /// [`run`](Self::run) with caller-controlled cancellation of AI calls.
    pub async fn run_with_cancel(
        &self,
        content: &[u8],
        file_name: &str,
        mode: Option<ExtractionMode>,
        cancel: &CancellationToken,
    ) -> PipelineOutcome {
        let mut run = Run::new(file_name);
        let mode = mode.unwrap_or(self.config.extraction.mode);
        info!(file = file_name, bytes = content.len(), %mode, "Processing document");

        run.enter(PipelineStage::ReadingDocument);
        let items = match self.read(content, file_name).await {
            Ok(blocks) => {
                run.enter(PipelineStage::Extracting);
                self.extract(Source::Blocks(&blocks), file_name, mode, cancel, &mut run)
                    .await
            }
            Err(e) => {
                warn!(file = file_name, error = %e, "Document read failed");
                run.fail(PipelineStage::ReadingDocument);
                vec![placeholders::document_read_error(&e.to_string())]
            }
        };

        self.finish(run, items)
    }

    /// Process text that was already extracted from a document.
    pub async fn run_text(
        &self,
        text: &str,
        file_name: &str,
        mode: Option<ExtractionMode>,
    ) -> PipelineOutcome {
        let mut run = Run::new(file_name);
        let mode = mode.unwrap_or(self.config.extraction.mode);
        info!(file = file_name, chars = text.len(), %mode, "Processing text");

        run.enter(PipelineStage::Extracting);
        let items = self
            .extract(
                Source::Text(text),
                file_name,
                mode,
                &CancellationToken::new(),
                &mut run,
            )
            .await;
        self.finish(run, items)
    }

    async fn read(&self, content: &[u8], file_name: &str) -> ChecklistResult<Vec<TextBlock>> {
        let reader = route_reader(&self.readers, file_name, content).ok_or_else(|| {
            ChecklistError::unsupported_format(file_name)
        })?;
        let blocks = reader.read(content).await?;
        info!(reader = reader.name(), blocks = blocks.len(), "Document read");
        Ok(blocks)
    }

    async fn extract(
        &self,
        source: Source<'_>,
        file_name: &str,
        mode: ExtractionMode,
        cancel: &CancellationToken,
        run: &mut Run,
    ) -> Vec<ChecklistItem> {
        match (mode, &self.ai) {
            (ExtractionMode::Rules, _) | (ExtractionMode::Auto, None) => self.rules(source, file_name),
            (ExtractionMode::Ai, None) => {
                warn!("AI extraction requested without a completion backend");
                run.fail(PipelineStage::Extracting);
                vec![placeholders::configuration_error()]
            }
            (ExtractionMode::Ai, Some(ai)) => {
                let text = source.text();
                match ai.try_extract(&text, file_name, cancel).await {
                    Ok(items) => items,
                    Err(e) => {
                        run.fail(PipelineStage::Extracting);
                        failure_items(&e, &text)
                    }
                }
            }
            (ExtractionMode::Auto, Some(ai)) => {
                match ai.try_extract(&source.text(), file_name, cancel).await {
                    Ok(items) if usable(&items) => items,
                    Ok(_) => {
                        warn!(file = file_name, "AI extraction found nothing usable, using rules");
                        self.rules(source, file_name)
                    }
                    Err(e) => {
                        warn!(file = file_name, error = %e, "AI extraction failed, using rules");
                        self.rules(source, file_name)
                    }
                }
            }
        }
    }

    fn rules(&self, source: Source<'_>, file_name: &str) -> Vec<ChecklistItem> {
        match source {
            Source::Blocks(blocks) => self.engine.extract_blocks(blocks, file_name),
            Source::Text(text) => self.engine.extract_text(text, file_name),
        }
    }

    fn finish(&self, mut run: Run, items: Vec<ChecklistItem>) -> PipelineOutcome {
        run.enter(PipelineStage::Compiling);
        let schema = self.compiler.compile(&items, &run.title);
        let has_issues = items.iter().any(ChecklistItem::is_issue);

        let state = run.failed.map_or(PipelineState::Done, |stage| PipelineState::Failed { stage });
        info!(
            items = items.len(),
            elements = schema.element_count(),
            has_issues,
            "Pipeline finished"
        );

        PipelineOutcome {
            items,
            schema,
            stages: run.stages,
            state,
            has_issues,
        }
    }
}

enum Source<'a> {
    Blocks(&'a [TextBlock]),
    Text(&'a str),
}

impl Source<'_> {
    fn text(&self) -> String {
        match self {
            Source::Blocks(blocks) => blocks_to_text(blocks),
            Source::Text(text) => text.to_string(),
        }
    }
}

struct Run {
    title: String,
    stages: Vec<PipelineStage>,
    failed: Option<PipelineStage>,
}

impl Run {
    fn new(file_name: &str) -> Self {
        Self {
            title: title_for(file_name),
            stages: Vec::with_capacity(3),
            failed: None,
        }
    }

    fn enter(&mut self, stage: PipelineStage) {
        self.stages.push(stage);
    }

    fn fail(&mut self, stage: PipelineStage) {
        self.failed.get_or_insert(stage);
    }
}

/// AI output worth keeping: real content, not just placeholders.
fn usable(items: &[ChecklistItem]) -> bool {
    !items.iter().all(|item| {
        item.is_issue() || item.id == placeholders::NO_ITEMS_FOUND_ID
    })
}

/// Schema title for a file: its stem, or the default.
pub fn title_for(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{CompletionResponse, MockCompletion};
    use crate::types::ItemType;
    use async_trait::async_trait;

    struct LinesReader;

    #[async_trait]
    impl DocumentReader for LinesReader {
        async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>> {
            let text = std::str::from_utf8(content).map_err(|e| ChecklistError::read(e.to_string()))?;
            Ok(text.lines().map(TextBlock::line).collect())
        }

        fn supported_extensions(&self) -> &[&str] {
            &["txt"]
        }

        fn name(&self) -> &'static str {
            "lines"
        }
    }

    fn pipeline() -> ChecklistPipeline {
        ChecklistPipeline::new(ChecklistConfig::default()).with_reader(Arc::new(LinesReader))
    }

    fn with_mock(mock: MockCompletion) -> ChecklistPipeline {
        let extractor = AiExtractor::new(Arc::new(mock), Default::default());
        pipeline().with_ai_extractor(extractor)
    }

    const DOC: &[u8] = b"Fund name:\nIs the fund authorised?\nThe depositary must hold all assets";

    #[tokio::test]
    async fn test_rules_run() {
        let outcome = pipeline()
            .run(DOC, "Fund Checklist.txt", Some(ExtractionMode::Rules))
            .await;
        assert_eq!(outcome.state, PipelineState::Done);
        assert_eq!(
            outcome.stages,
            vec![
                PipelineStage::ReadingDocument,
                PipelineStage::Extracting,
                PipelineStage::Compiling
            ]
        );
        assert_eq!(outcome.schema.title, "Fund Checklist");
        assert_eq!(outcome.items.len(), 3);
        assert_eq!(outcome.schema.element_count(), 3);
        assert!(!outcome.has_issues);
    }

    #[tokio::test]
    async fn test_unreadable_document_still_compiles() {
        let outcome = pipeline().run(b"\xff\xfe", "bad.txt", None).await;
        assert_eq!(
            outcome.state,
            PipelineState::Failed {
                stage: PipelineStage::ReadingDocument
            }
        );
        assert_eq!(outcome.items[0].id, "document_read_error");
        assert_eq!(outcome.schema.element_count(), 1);
        assert!(outcome.has_issues);
        assert!(!outcome.stages.contains(&PipelineStage::Extracting));
    }

    #[tokio::test]
    async fn test_unknown_format_is_read_failure() {
        let outcome = pipeline().run(b"data", "file.bin", None).await;
        assert_eq!(outcome.items[0].id, "document_read_error");
        assert_eq!(outcome.schema.title, "file");
    }

    #[tokio::test]
    async fn test_ai_mode_without_backend() {
        let outcome = pipeline().run(DOC, "a.txt", Some(ExtractionMode::Ai)).await;
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].id, "configuration_error");
        assert!(outcome.has_issues);
        assert_eq!(
            outcome.state,
            PipelineState::Failed {
                stage: PipelineStage::Extracting
            }
        );
        assert_eq!(outcome.stages.last(), Some(&PipelineStage::Compiling));
    }

    #[tokio::test]
    async fn test_auto_uses_ai_when_it_succeeds() {
        let mut mock = MockCompletion::new();
        mock.expect_complete().returning(|_| {
            Ok(CompletionResponse::new(
                r#"[{"id":"approval","text":"Is the fund approved?","type":"Boolean"}]"#,
                "m",
            ))
        });
        let outcome = with_mock(mock).run(DOC, "a.txt", None).await;
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].item_type, ItemType::Boolean);
    }

    #[tokio::test]
    async fn test_auto_falls_back_to_rules() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(ChecklistError::authentication("bad key")));
        let outcome = with_mock(mock).run(DOC, "a.txt", Some(ExtractionMode::Auto)).await;
        assert_eq!(outcome.items.len(), 3);
        assert!(!outcome.has_issues);

        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Ok(CompletionResponse::new("[]", "m")));
        let outcome = with_mock(mock).run(DOC, "a.txt", None).await;
        assert_eq!(outcome.items.len(), 3);
    }

    #[tokio::test]
    async fn test_ai_mode_keeps_placeholders() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(ChecklistError::rate_limit("slow down")));
        let outcome = with_mock(mock).run(DOC, "a.txt", Some(ExtractionMode::Ai)).await;
        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.has_issues);
        assert_eq!(
            outcome.state,
            PipelineState::Failed {
                stage: PipelineStage::Extracting
            }
        );
    }

    #[tokio::test]
    async fn test_ai_failure_on_text_records_extracting_stage() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(ChecklistError::rate_limit("slow down")));
        let outcome = with_mock(mock)
            .run_text("Is the fund authorised?", "a.txt", Some(ExtractionMode::Ai))
            .await;
        assert_eq!(outcome.items[0].id, "rate_limit_error");
        assert_eq!(
            outcome.state,
            PipelineState::Failed {
                stage: PipelineStage::Extracting
            }
        );
    }

    #[tokio::test]
    async fn test_auto_fallback_is_not_a_failure() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(ChecklistError::rate_limit("slow down")));
        let outcome = with_mock(mock).run(DOC, "a.txt", Some(ExtractionMode::Auto)).await;
        assert_eq!(outcome.state, PipelineState::Done);
    }

    #[tokio::test]
    async fn test_run_text() {
        let outcome = pipeline()
            .run_text("Name of depositary:\n", "", Some(ExtractionMode::Rules))
            .await;
        assert_eq!(outcome.stages, vec![PipelineStage::Extracting, PipelineStage::Compiling]);
        assert_eq!(outcome.schema.title, DEFAULT_TITLE);
        assert_eq!(outcome.items[0].item_type, ItemType::Text);
    }

    #[test]
    fn test_model_chain_follows_fallback_config() {
        let mut mock = MockCompletion::new();
        mock.expect_model_name().return_const("primary".to_string());
        let mut config = ChecklistConfig::default();
        config.fallback.models = vec!["backup".into(), "primary".into()];

        let pipeline = ChecklistPipeline::new(config).with_completion(Arc::new(mock));
        assert!(pipeline.has_ai());
        assert_eq!(pipeline.model_chain(), ["primary", "backup"]);
        assert!(ChecklistPipeline::new(ChecklistConfig::default())
            .model_chain()
            .is_empty());
    }

    #[test]
    fn test_title_for() {
        assert_eq!(title_for("dir/Annual Review.docx"), "Annual Review");
        assert_eq!(title_for(""), DEFAULT_TITLE);
    }
}
