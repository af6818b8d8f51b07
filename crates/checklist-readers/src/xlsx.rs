//! Spreadsheet reading using calamine.

use std::io::Cursor;

use async_trait::async_trait;
use calamine::{open_workbook_from_rs, Reader, Xlsx};
use tracing::debug;

use checklist_core::error::ChecklistResult;
use checklist_core::traits::DocumentReader;
use checklist_core::types::TextBlock;

use crate::error::{ReadError, ReadResult};
use crate::{contains_bytes, parse_blocking, ZIP_MAGIC};

/// Reads the first worksheet. The first non-blank row holds the headers.
///
/// Each non-blank row becomes one block as-is; an empty first cell is a
/// grouping column, not a wrapped question.
#[derive(Debug, Clone, Default)]
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }

    fn read_sync(content: Vec<u8>) -> ReadResult<Vec<TextBlock>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(content))
            .map_err(|e| ReadError::corrupt("XLSX", e))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| ReadError::corrupt("XLSX", e))?,
            None => return Ok(Vec::new()),
        };

        let blocks = range
            .rows()
            .map(|row| {
                let mut cells: Vec<String> =
                    row.iter().map(|c| c.to_string().trim().to_string()).collect();
                // Ranges are rectangular; drop the padding on short rows.
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .filter(|cells| !cells.is_empty())
            .map(TextBlock::sheet_row)
            .collect();

        Ok(blocks)
    }
}

#[async_trait]
impl DocumentReader for XlsxReader {
    async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>> {
        let blocks = parse_blocking(content, Self::read_sync).await?;
        debug!(rows = blocks.len(), "XLSX read");
        Ok(blocks)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xlsm"]
    }

    fn sniff(&self, content: &[u8]) -> bool {
        content.starts_with(ZIP_MAGIC) && contains_bytes(content, b"xl/")
    }

    fn name(&self) -> &'static str {
        "calamine"
    }
}
