//! Reader registry routing documents to the matching reader.

use std::sync::Arc;

use tracing::info;

use checklist_core::error::ChecklistResult;
use checklist_core::traits::{route_reader, DocumentReader};
use checklist_core::types::TextBlock;

use crate::error::ReadError;
use crate::{LegacyDocReader, PlainTextReader};

#[cfg(feature = "docx")]
use crate::DocxReader;

#[cfg(feature = "pdf")]
use crate::PdfReader;

#[cfg(feature = "xlsx")]
use crate::XlsxReader;

/// Routes documents by file extension, then by magic bytes.
#[derive(Clone)]
pub struct ReaderRegistry {
    readers: Vec<Arc<dyn DocumentReader>>,
}

impl ReaderRegistry {
    /// Create new empty registry.
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Create registry with every reader compiled in.
    pub fn with_defaults() -> Self {
        Self {
            readers: Self::all(),
        }
    }

    /// Get all available readers.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Arc<dyn DocumentReader>> {
        let mut readers: Vec<Arc<dyn DocumentReader>> = Vec::new();

        #[cfg(feature = "docx")]
        readers.push(Arc::new(DocxReader::new()));

        #[cfg(feature = "pdf")]
        readers.push(Arc::new(PdfReader::new()));

        #[cfg(feature = "xlsx")]
        readers.push(Arc::new(XlsxReader::new()));

        readers.push(Arc::new(LegacyDocReader::new()));
        readers.push(Arc::new(PlainTextReader::new()));

        readers
    }

    /// Add a reader. Later readers lose ties to earlier ones.
    pub fn add_reader(mut self, reader: Arc<dyn DocumentReader>) -> Self {
        self.readers.push(reader);
        self
    }

    /// Reader for a document, if any.
    pub fn route(&self, file_name: &str, content: &[u8]) -> Option<&Arc<dyn DocumentReader>> {
        route_reader(&self.readers, file_name, content)
    }

    /// Read a document with the matching reader.
    pub async fn read(&self, content: &[u8], file_name: &str) -> ChecklistResult<Vec<TextBlock>> {
        let reader = self
            .route(file_name, content)
            .ok_or_else(|| ReadError::UnsupportedFormat(file_name.to_string()))?;
        info!(file_name, reader = reader.name(), bytes = content.len(), "Reading document");
        reader.read(content).await
    }

    /// Check if any reader handles the file name.
    pub fn supports(&self, file_name: &str) -> bool {
        self.readers.iter().any(|r| r.supports(file_name))
    }

    /// List all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions().iter().copied())
            .collect()
    }

    /// Registered readers, for handing to the pipeline.
    pub fn readers(&self) -> &[Arc<dyn DocumentReader>] {
        &self.readers
    }

    /// Get the number of registered readers.
    pub fn len(&self) -> usize {
        self.readers.len()
    }

    /// Check if the registry has no registered readers.
    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::error::{ChecklistError, ErrorCode};

    #[test]
    fn test_defaults_cover_known_extensions() {
        let registry = ReaderRegistry::with_defaults();
        for name in ["a.doc", "b.txt", "c.md"] {
            assert!(registry.supports(name), "{name}");
        }
        #[cfg(all(feature = "docx", feature = "pdf", feature = "xlsx"))]
        {
            assert_eq!(registry.len(), 5);
            assert!(registry.supports("d.docx"));
            assert!(registry.supports("e.pdf"));
            assert!(registry.supports("f.xlsx"));
        }
        assert!(!registry.supports("photo.png"));
    }

    #[test]
    fn test_routes_unknown_extension_by_magic() {
        let registry = ReaderRegistry::with_defaults();
        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        assert_eq!(registry.route("upload", &ole).map(|r| r.name()), Some("legacy-doc"));
        #[cfg(feature = "pdf")]
        assert_eq!(
            registry.route("upload.bin", b"%PDF-1.5").map(|r| r.name()),
            Some("pdf-extract")
        );
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let registry = ReaderRegistry::with_defaults();
        let err = registry.read(b"\x89PNG", "photo.png").await.unwrap_err();
        assert!(matches!(err, ChecklistError::Read { .. }));
        assert_eq!(err.code(), ErrorCode::ReadUnsupportedFormat);
    }

    #[tokio::test]
    async fn test_reads_text() {
        let registry = ReaderRegistry::new().add_reader(Arc::new(PlainTextReader::new()));
        let blocks = tokio_test::assert_ok!(registry.read(b"one\ntwo", "notes.txt").await);
        assert_eq!(blocks.len(), 2);
    }
}
