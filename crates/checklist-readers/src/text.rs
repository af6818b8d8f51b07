//! Plain text and Markdown reading.

use async_trait::async_trait;

use checklist_core::error::ChecklistResult;
use checklist_core::traits::DocumentReader;
use checklist_core::types::TextBlock;

/// Reader for `.txt` and `.md` files. Invalid UTF-8 is replaced, never rejected.
#[derive(Debug, Clone, Default)]
pub struct PlainTextReader;

impl PlainTextReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentReader for PlainTextReader {
    async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>> {
        let decoded = String::from_utf8_lossy(content);
        let text: &str = &decoded;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(TextBlock::line)
            .collect())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md"]
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_lines_without_bom() {
        let reader = PlainTextReader::new();
        let blocks = reader
            .read("\u{feff}Checklist\n\n- Is the fund open?\n".as_bytes())
            .await
            .unwrap();
        assert_eq!(
            blocks,
            vec![TextBlock::line("Checklist"), TextBlock::line("- Is the fund open?")]
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let blocks = PlainTextReader::new().read(b"Caf\xe9 menu").await.unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].cells[0].starts_with("Caf"));
    }
}
