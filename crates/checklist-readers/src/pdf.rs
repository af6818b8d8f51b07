//! PDF reading using pdf-extract.

use async_trait::async_trait;
use tracing::{debug, warn};

use checklist_core::error::ChecklistResult;
use checklist_core::traits::DocumentReader;
use checklist_core::types::TextBlock;

use crate::error::{ReadError, ReadResult};
use crate::parse_blocking;

/// PDF reader. Every non-blank text line becomes a line block.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create new PDF reader.
    pub fn new() -> Self {
        Self
    }

    fn read_sync(content: Vec<u8>) -> ReadResult<Vec<TextBlock>> {
        let text = pdf_extract::extract_text_from_mem(&content)
            .map_err(|e| ReadError::corrupt("PDF", e))?;
        Ok(text_lines(&text))
    }
}

/// Split extracted text into trimmed, non-blank line blocks.
fn text_lines(text: &str) -> Vec<TextBlock> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(TextBlock::line)
        .collect()
}

#[async_trait]
impl DocumentReader for PdfReader {
    async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>> {
        let blocks = parse_blocking(content, Self::read_sync).await?;
        if blocks.is_empty() {
            // Scanned PDFs carry images only.
            warn!("PDF contained no extractable text");
        }
        debug!(lines = blocks.len(), "PDF read");
        Ok(blocks)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn sniff(&self, content: &[u8]) -> bool {
        content.starts_with(b"%PDF")
    }

    fn name(&self) -> &'static str {
        "pdf-extract"
    }
}
