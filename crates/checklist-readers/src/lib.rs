//! checklist-readers - Document readers for checklist extraction.
//!
//! Every reader implements [`checklist_core::DocumentReader`] and turns raw
//! bytes into ordered [`TextBlock`]s. Parsing runs on the blocking pool.
//!
//! # Features
//!
//! - `docx` (default) - Word documents via docx-rs
//! - `pdf` (default) - PDF text via pdf-extract
//! - `xlsx` (default) - first worksheet via calamine
//! - `full` - All readers
//!
//! Legacy `.doc` scanning and plain text are always available.
//!
//! # Example
//!
//! ```ignore
//! use checklist_readers::ReaderRegistry;
//!
//! let registry = ReaderRegistry::with_defaults();
//! let blocks = registry.read(&bytes, "checklist.docx").await?;
//! ```

mod error;
mod legacy_doc;
mod registry;
mod text;

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "docx")]
mod docx;

#[cfg(feature = "xlsx")]
mod xlsx;

pub use error::{ReadError, ReadResult};
pub use legacy_doc::LegacyDocReader;
pub use registry::ReaderRegistry;
pub use text::PlainTextReader;

#[cfg(feature = "pdf")]
pub use pdf::PdfReader;

#[cfg(feature = "docx")]
pub use docx::DocxReader;

#[cfg(feature = "xlsx")]
pub use xlsx::XlsxReader;

pub use checklist_core::traits::DocumentReader;
pub use checklist_core::types::{BlockKind, TextBlock};

/// ZIP local file header shared by the OOXML formats.
#[cfg(any(feature = "docx", feature = "xlsx"))]
pub(crate) const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Run a synchronous parser on the blocking pool.
pub(crate) async fn parse_blocking<F>(content: &[u8], parse: F) -> ReadResult<Vec<TextBlock>>
where
    F: FnOnce(Vec<u8>) -> ReadResult<Vec<TextBlock>> + Send + 'static,
{
    let content = content.to_vec();
    tokio::task::spawn_blocking(move || parse(content)).await?
}

/// Whether `needle` appears anywhere in `haystack`.
#[cfg(any(feature = "docx", feature = "xlsx"))]
pub(crate) fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Merge rows whose first cell is empty into the row above, cell by cell.
///
/// Word tables wrap long questions onto rows that only fill the later
/// columns. Spreadsheet rows are never merged: an empty first cell there
/// usually means a grouping column filled once per group.
#[cfg(feature = "docx")]
pub(crate) fn merge_continuation_rows(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let mut merged: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let continues = row.first().map_or(true, |c| c.trim().is_empty());
        match merged.last_mut() {
            Some(previous) if continues => {
                for (i, cell) in row.into_iter().enumerate() {
                    let cell = cell.trim();
                    if cell.is_empty() {
                        continue;
                    }
                    match previous.get_mut(i) {
                        Some(existing) if !existing.is_empty() => {
                            existing.push(' ');
                            existing.push_str(cell);
                        }
                        Some(existing) => existing.push_str(cell),
                        None => {
                            previous.resize(i, String::new());
                            previous.push(cell.to_string());
                        }
                    }
                }
            }
            _ => merged.push(row.into_iter().map(|c| c.trim().to_string()).collect()),
        }
    }
    merged
}
