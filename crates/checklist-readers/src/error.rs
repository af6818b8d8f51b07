//! Reader error types.

use checklist_core::error::{ChecklistError, ErrorCode};
use thiserror::Error;

/// Errors that can occur while reading a document.
#[derive(Error, Debug)]
pub enum ReadError {
    /// No reader handles the file.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// The container could not be opened or decoded.
    #[error("{format} read failed: {message}")]
    Corrupt {
        format: &'static str,
        message: String,
    },

    /// IO error while reading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking parse task panicked or was cancelled.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ReadError {
    pub(crate) fn corrupt(format: &'static str, message: impl ToString) -> Self {
        Self::Corrupt {
            format,
            message: message.to_string(),
        }
    }
}

/// Result type for read operations.
pub type ReadResult<T> = Result<T, ReadError>;

impl From<ReadError> for ChecklistError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::UnsupportedFormat(name) => ChecklistError::unsupported_format(format!(
                "No reader for '{}'. Supported: .docx, .doc, .pdf, .xlsx, .txt, .md",
                name
            )),
            other => ChecklistError::Read {
                message: other.to_string(),
                code: ErrorCode::ReadCorrupt,
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_read_error() {
        let err: ChecklistError = ReadError::corrupt("DOCX", "missing word/document.xml").into();
        assert_eq!(err.code(), ErrorCode::ReadCorrupt);
        assert!(err.to_string().contains("DOCX read failed"));

        let err: ChecklistError = ReadError::UnsupportedFormat("photo.png".into()).into();
        assert_eq!(err.code(), ErrorCode::ReadUnsupportedFormat);
    }
}
