//! Checklist extraction.
//!
//! [`ExtractionEngine`] applies the rule paths to reader output:
//! - spreadsheet rows go to the sheet path
//! - table rows go to the table path, falling back to the prose blocks
//! - everything else goes to the line path
//!
//! [`AiExtractor`] prompts a completion backend instead. Both always return at
//! least one item; failures become informative placeholders.

mod ai;
mod classify;
mod cleanup;
mod lines;
mod options;
pub mod placeholders;
mod prompts;
mod sheets;
mod tables;
mod validate;

pub(crate) use ai::failure_items;
pub use ai::{parse_items, AiExtractor};
pub use classify::{
    classify_line, classify_question, classify_table_hint, contains_question_keywords,
    format_label, has_multiple_options, is_obvious_non_question, is_required,
    is_standalone_numbering, looks_like_question,
};
pub use cleanup::{
    capitalize_first, clean_line, collapse_whitespace, is_cover_page, is_non_content,
    lowercase_first, strip_bullets, strip_lettered, strip_parenthesized, strip_roman,
    strip_simple_numbering,
};
pub use options::{
    clean_option_text, dropdown_options, hint_options, is_plausible_option, question_options,
};
pub use prompts::{truncate_content, TRUNCATION_MARKER};
pub use sheets::clean_question_text;
pub use tables::{clean_question_number, is_header_row, is_valid_question_number};
pub use validate::finalize;

use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::types::{BlockKind, ChecklistItem, TextBlock};

/// Rule-based extraction over reader blocks.
#[derive(Debug, Clone, Default)]
pub struct ExtractionEngine {
    config: ExtractionConfig,
}

impl ExtractionEngine {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract items from reader blocks. Never empty.
    pub fn extract_blocks(&self, blocks: &[TextBlock], file_name: &str) -> Vec<ChecklistItem> {
        let has = |kind: BlockKind| blocks.iter().any(|b| b.kind == kind);

        let (path, items) = if has(BlockKind::SheetRow) {
            ("sheet", sheets::extract_sheet(blocks))
        } else if has(BlockKind::TableRow) {
            let items = tables::extract_tables(blocks);
            if items.is_empty() {
                warn!(file = file_name, "Tables yielded no items, using paragraphs");
                ("lines", lines::extract_lines(blocks, file_name, &self.config))
            } else {
                ("table", items)
            }
        } else {
            ("lines", lines::extract_lines(blocks, file_name, &self.config))
        };

        if items.is_empty() {
            warn!(file = file_name, path, "No checklist items found");
            return vec![placeholders::no_items_found()];
        }

        let items = finalize(items);
        info!(file = file_name, path, items = items.len(), "Rule extraction complete");
        items
    }

    /// Extract items from already-extracted text, one line block per line.
    pub fn extract_text(&self, text: &str, file_name: &str) -> Vec<ChecklistItem> {
        let blocks: Vec<TextBlock> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(TextBlock::line)
            .collect();
        self.extract_blocks(&blocks, file_name)
    }
}
