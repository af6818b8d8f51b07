//! Document reader trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChecklistResult;
use crate::types::TextBlock;

/// Turns raw document bytes into ordered text blocks.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    /// Read the document. Fails with `ChecklistError::Read` on a bad container.
    async fn read(&self, content: &[u8]) -> ChecklistResult<Vec<TextBlock>>;

    /// Lowercase file extensions handled by this reader, without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Check if this reader handles the given file name.
    fn supports(&self, file_name: &str) -> bool {
        match extension_of(file_name) {
            Some(ext) => self.supported_extensions().iter().any(|e| *e == ext),
            None => false,
        }
    }

    /// Recognize the format from leading bytes when the extension is missing
    /// or unknown.
    fn sniff(&self, _content: &[u8]) -> bool {
        false
    }

    /// Get reader name for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Pick the reader for a document: by extension first, then by content.
pub fn route_reader<'a>(
    readers: &'a [Arc<dyn DocumentReader>],
    file_name: &str,
    content: &[u8],
) -> Option<&'a Arc<dyn DocumentReader>> {
    readers
        .iter()
        .find(|r| r.supports(file_name))
        .or_else(|| readers.iter().find(|r| r.sniff(content)))
}

/// Lowercase extension of a file name, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
