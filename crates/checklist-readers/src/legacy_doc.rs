//! Best-effort text recovery from legacy binary `.doc` files.
//!
//! The OLE container is not parsed. Printable ASCII runs are scanned out of
//! the raw bytes and anything that looks like font tables or Office metadata
//! is dropped.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use checklist_core::error::ChecklistResult;
use checklist_core::traits::DocumentReader;
use checklist_core::types::TextBlock;

/// OLE2 compound file signature.
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Shortest run kept.
const MIN_RUN: usize = 4;

static ARTIFACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)microsoft|\bword\b|times|arial|calibri|font").unwrap());

static NUMERIC_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s.\-]+$").unwrap());

/// Legacy Word reader producing line blocks.
#[derive(Debug, Clone, Default)]
pub struct LegacyDocReader;

impl LegacyDocReader {
    pub fn new() -> Self {
        Self
    }
}

/// Printable ASCII runs of at least [`MIN_RUN`] chars, trimmed.
fn ascii_runs(content: &[u8]) -> Vec<String> {
    content
        .split(|b| !(0x20..=0x7e).contains(b))
        .filter(|run| run.len() >= MIN_RUN)
        .map(|run| String::from_utf8_lossy(run).trim().to_string())
        .collect()
}

fn is_artifact(run: &str) -> bool {
    run.chars().count() < MIN_RUN
        || !run.chars().any(|c| c.is_ascii_alphabetic())
        || NUMERIC_ONLY.is_match(run)
        || ARTIFACT.is_match(run)
}

#[async_trait]
impl DocumentReader for LegacyDocReader {
    async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>> {
        let blocks: Vec<TextBlock> = ascii_runs(content)
            .into_iter()
            .filter(|run| !is_artifact(run))
            .map(TextBlock::line)
            .collect();
        if blocks.is_empty() {
            warn!("No readable text recovered from legacy .doc");
        }
        debug!(lines = blocks.len(), "Legacy DOC scanned");
        Ok(blocks)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["doc"]
    }

    fn sniff(&self, content: &[u8]) -> bool {
        content.starts_with(OLE_MAGIC)
    }

    fn name(&self) -> &'static str {
        "legacy-doc"
    }
}
