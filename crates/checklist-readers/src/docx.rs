//! DOCX reading using docx-rs.
//!
//! Emits headings, paragraphs and table rows in document order.

use async_trait::async_trait;
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::debug;

use checklist_core::error::ChecklistResult;
use checklist_core::traits::DocumentReader;
use checklist_core::types::TextBlock;

use crate::error::{ReadError, ReadResult};
use crate::{contains_bytes, merge_continuation_rows, parse_blocking, ZIP_MAGIC};

/// Word (OOXML) document reader.
#[derive(Debug, Clone)]
pub struct DocxReader {
    /// Whether styled headings are emitted as heading blocks.
    extract_headings: bool,
}

impl Default for DocxReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxReader {
    /// Create new DOCX reader with default settings.
    pub fn new() -> Self {
        Self {
            extract_headings: true,
        }
    }

    /// Configure whether styled headings are kept apart from paragraphs.
    pub fn with_headings(mut self, extract: bool) -> Self {
        self.extract_headings = extract;
        self
    }

    /// Parse synchronously (called within spawn_blocking).
    fn read_sync(content: Vec<u8>, extract_headings: bool) -> ReadResult<Vec<TextBlock>> {
        let docx = docx_rs::read_docx(&content)
            .map_err(|e| ReadError::corrupt("DOCX", format!("failed to parse: {}", e)))?;

        let mut blocks = Vec::new();
        for child in docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let text = paragraph_text(&p);
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    if extract_headings && is_heading(&p) {
                        blocks.push(TextBlock::heading(text));
                    } else {
                        blocks.push(TextBlock::paragraph(text));
                    }
                }
                DocumentChild::Table(t) => {
                    blocks.extend(
                        merge_continuation_rows(table_rows(&t))
                            .into_iter()
                            .map(TextBlock::table_row),
                    );
                }
                _ => {}
            }
        }
        Ok(blocks)
    }
}

fn is_heading(p: &Paragraph) -> bool {
    p.property.style.as_ref().is_some_and(|style| {
        let id = style.val.to_lowercase();
        id.starts_with("heading") || id.contains("title")
    })
}

/// Text of a paragraph, including hyperlink runs.
fn paragraph_text(p: &Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => {
                for run_child in &r.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        for run_child in &r.children {
                            if let RunChild::Text(t) = run_child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    text
}

/// Cell texts of every table row. Multi-paragraph cells are joined by a space.
fn table_rows(t: &Table) -> Vec<Vec<String>> {
    t.rows
        .iter()
        .map(|row| {
            let TableChild::TableRow(r) = row;
            r.cells
                .iter()
                .map(|cell| {
                    let TableRowChild::TableCell(c) = cell;
                    c.children
                        .iter()
                        .filter_map(|child| match child {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect()
        })
        .collect()
}

#[async_trait]
impl DocumentReader for DocxReader {
    async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>> {
        let extract_headings = self.extract_headings;
        let blocks =
            parse_blocking(content, move |bytes| Self::read_sync(bytes, extract_headings)).await?;
        debug!(blocks = blocks.len(), "DOCX read");
        Ok(blocks)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn sniff(&self, content: &[u8]) -> bool {
        content.starts_with(ZIP_MAGIC) && contains_bytes(content, b"word/")
    }

    fn name(&self) -> &'static str {
        "docx-rs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::types::BlockKind;
    use docx_rs::{Docx, Run, TableCell, TableRow};

    fn cell(text: &str) -> TableCell {
        TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
    }

    fn build(docx: Docx) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    fn sample() -> Vec<u8> {
        build(
            Docx::new()
                .add_paragraph(
                    Paragraph::new()
                        .style("Heading1")
                        .add_run(Run::new().add_text("Fund Details")),
                )
                .add_paragraph(
                    Paragraph::new().add_run(Run::new().add_text("Please complete every row.")),
                )
                .add_table(Table::new(vec![
                    TableRow::new(vec![cell("No."), cell("Question"), cell("Response")]),
                    TableRow::new(vec![cell("1.1"), cell("Is the fund"), cell("Yes/No")]),
                    TableRow::new(vec![cell(""), cell("authorised?"), cell("")]),
                ])),
        )
    }

    #[tokio::test]
    async fn test_reads_headings_paragraphs_and_rows() {
        let reader = DocxReader::new();
        let blocks = reader.read(&sample()).await.unwrap();

        assert_eq!(blocks[0], TextBlock::heading("Fund Details"));
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
        let rows: Vec<_> = blocks
            .iter()
            .filter(|b| b.kind == BlockKind::TableRow)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].cells, vec!["1.1", "Is the fund authorised?", "Yes/No"]);
    }

    #[tokio::test]
    async fn test_headings_can_be_flattened() {
        let reader = DocxReader::new().with_headings(false);
        let blocks = reader.read(&sample()).await.unwrap();
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
    }

    #[tokio::test]
    async fn test_garbage_is_read_error() {
        let reader = DocxReader::new();
        assert!(reader.read(&[]).await.is_err());
        assert!(reader.read(b"PK\x03\x04not a zip").await.is_err());
    }

    #[test]
    fn test_sniff() {
        let reader = DocxReader::new();
        assert!(reader.sniff(&sample()));
        assert!(!reader.sniff(b"%PDF-1.4"));
        assert!(reader.supports("Checklist.DOCX"));
    }
}
