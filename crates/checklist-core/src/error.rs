//! Error types for checklist operations.
//!
//! Every variant carries a stable [`ErrorCode`] so callers can branch on the
//! failure class without matching message text. Backend failures are further
//! split into transient ones (worth trying the next model) and fatal ones
//! (credentials or configuration, never retried).

use thiserror::Error;

/// Result type alias for checklist operations.
pub type ChecklistResult<T> = Result<T, ChecklistError>;

/// Main error type for all checklist operations.
#[derive(Error, Debug)]
pub enum ChecklistError {
    /// The document container could not be opened or decoded.
    #[error("Read error: {message}")]
    Read {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication with a completion backend failed.
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        code: ErrorCode,
    },

    /// Rate limit exceeded on a completion backend.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        code: ErrorCode,
        retry_after: Option<u64>,
    },

    /// The requested model does not exist or is currently unavailable.
    #[error("Model unavailable: {message}")]
    ModelUnavailable {
        message: String,
        code: ErrorCode,
        model: Option<String>,
    },

    /// Completion backend returned an error or an unusable response.
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Every model in the fallback chain failed.
    #[error("All models failed. Tried: {}", .tried.join(", "))]
    AllModelsFailed {
        tried: Vec<String>,
        /// Whether every failure was a rate limit.
        rate_limited: bool,
    },

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The completion call exceeded its deadline.
    #[error("Timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// No JSON of the expected shape could be recovered from a model response.
    #[error("Normalization failed: {message}")]
    Normalization {
        message: String,
        code: ErrorCode,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Read (READ_xxx)
    ReadUnsupportedFormat,
    ReadCorrupt,
    ReadEmpty,

    // Authentication (AUTH_xxx)
    AuthInvalidKey,
    AuthMissingCredentials,

    // Rate Limit (RATE_xxx)
    RateLimitExceeded,

    // Backend (LLM_xxx)
    LlmConnectionFailed,
    LlmGenerationFailed,
    LlmInvalidResponse,
    LlmModelUnavailable,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Normalization (NORM_xxx)
    NormNoJson,
    NormUnrepairable,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ReadUnsupportedFormat => "READ_001",
            ErrorCode::ReadCorrupt => "READ_002",
            ErrorCode::ReadEmpty => "READ_003",
            ErrorCode::AuthInvalidKey => "AUTH_001",
            ErrorCode::AuthMissingCredentials => "AUTH_002",
            ErrorCode::RateLimitExceeded => "RATE_001",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmGenerationFailed => "LLM_002",
            ErrorCode::LlmInvalidResponse => "LLM_003",
            ErrorCode::LlmModelUnavailable => "LLM_004",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::NormNoJson => "NORM_001",
            ErrorCode::NormUnrepairable => "NORM_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl ChecklistError {
    /// Create a read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
            code: ErrorCode::ReadCorrupt,
            source: None,
        }
    }

    /// Create a read error for a container type nobody handles.
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
            code: ErrorCode::ReadUnsupportedFormat,
            source: None,
        }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            code: ErrorCode::LlmGenerationFailed,
            source: None,
        }
    }

    /// Create a backend error for a response that could not be decoded.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            code: ErrorCode::LlmInvalidResponse,
            source: None,
        }
    }

    /// Create a model-unavailable error.
    pub fn model_unavailable(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
            code: ErrorCode::LlmModelUnavailable,
            model: Some(model.into()),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
            code: ErrorCode::RateLimitExceeded,
            retry_after: None,
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: ErrorCode::AuthInvalidKey,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create a normalization error.
    pub fn normalization(message: impl Into<String>) -> Self {
        Self::Normalization {
            message: message.into(),
            code: ErrorCode::NormUnrepairable,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Read { code, .. } => *code,
            Self::Authentication { code, .. } => *code,
            Self::RateLimit { code, .. } => *code,
            Self::ModelUnavailable { code, .. } => *code,
            Self::Backend { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Normalization { code, .. } => *code,
            Self::AllModelsFailed { .. } => ErrorCode::LlmGenerationFailed,
            Self::Timeout { .. } => ErrorCode::NetTimeout,
            Self::Configuration(_) | Self::UnsupportedProvider { .. } => {
                ErrorCode::AuthMissingCredentials
            }
            _ => ErrorCode::Internal,
        }
    }

    /// Whether another model in the fallback chain may succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimit { .. }
                | Self::ModelUnavailable { .. }
                | Self::Backend { .. }
                | Self::Network { .. }
                | Self::Timeout { .. }
                | Self::AllModelsFailed { .. }
        )
    }

    /// Whether the chain should pause before moving to the next model.
    pub fn wants_backoff(&self) -> bool {
        matches!(self, Self::RateLimit { .. } | Self::ModelUnavailable { .. })
    }

    /// Whether this failure was caused by rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimit { .. } => true,
            Self::AllModelsFailed { rate_limited, .. } => *rate_limited,
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Read { .. } => Some("Please check that the file is a valid DOCX, DOC, XLSX or PDF document"),
            Self::Authentication { .. } => Some("Please check your API key and authentication credentials"),
            Self::RateLimit { .. } => Some("Please wait a few minutes before trying again"),
            Self::ModelUnavailable { .. } => Some("Please configure a different model or add fallback models"),
            Self::AllModelsFailed { .. } => Some("Please try again later or configure additional fallback models"),
            Self::Timeout { .. } => Some("Please try a smaller document or raise the timeout"),
            Self::Configuration(_) => Some("Please check your checklist configuration"),
            _ => None,
        }
    }

    /// Convert from an HTTP status code returned by a completion backend.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::Authentication {
                message: body.to_string(),
                code: ErrorCode::AuthInvalidKey,
            },
            404 => Self::ModelUnavailable {
                message: body.to_string(),
                code: ErrorCode::LlmModelUnavailable,
                model: None,
            },
            429 => Self::RateLimit {
                message: body.to_string(),
                code: ErrorCode::RateLimitExceeded,
                retry_after: None,
            },
            _ => {
                let lower = body.to_lowercase();
                if lower.contains("rate limit") || lower.contains("limit_rpm") {
                    Self::rate_limit(body)
                } else if lower.contains("not found") || lower.contains("unavailable") {
                    Self::ModelUnavailable {
                        message: body.to_string(),
                        code: ErrorCode::LlmModelUnavailable,
                        model: None,
                    }
                } else {
                    Self::backend(format!("HTTP {}: {}", status, body))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error() {
        let err = ChecklistError::read("zip header missing");
        assert_eq!(err.code(), ErrorCode::ReadCorrupt);
        assert!(err.to_string().contains("zip header missing"));
        assert!(err.suggestion().is_some());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ReadCorrupt.as_str(), "READ_002");
        assert_eq!(ErrorCode::RateLimitExceeded.as_str(), "RATE_001");
        assert_eq!(ErrorCode::NormUnrepairable.as_str(), "NORM_002");
    }

    #[test]
    fn test_from_http_status() {
        assert!(matches!(
            ChecklistError::from_http_status(429, "slow down"),
            ChecklistError::RateLimit { .. }
        ));
        assert!(matches!(
            ChecklistError::from_http_status(401, "bad key"),
            ChecklistError::Authentication { .. }
        ));
        assert!(matches!(
            ChecklistError::from_http_status(404, "no such model"),
            ChecklistError::ModelUnavailable { .. }
        ));
        assert!(matches!(
            ChecklistError::from_http_status(400, "Rate limit exceeded: limit_rpm"),
            ChecklistError::RateLimit { .. }
        ));
        assert!(matches!(
            ChecklistError::from_http_status(503, "model is unavailable"),
            ChecklistError::ModelUnavailable { .. }
        ));
        assert!(matches!(
            ChecklistError::from_http_status(500, "boom"),
            ChecklistError::Backend { .. }
        ));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ChecklistError::rate_limit("x").is_transient());
        assert!(ChecklistError::rate_limit("x").wants_backoff());
        assert!(ChecklistError::backend("x").is_transient());
        assert!(!ChecklistError::backend("x").wants_backoff());
        assert!(!ChecklistError::authentication("x").is_transient());
        assert!(!ChecklistError::Configuration("x".into()).is_transient());
    }

    #[test]
    fn test_all_models_failed_message() {
        let err = ChecklistError::AllModelsFailed {
            tried: vec!["a".into(), "b".into()],
            rate_limited: true,
        };
        assert_eq!(err.to_string(), "All models failed. Tried: a, b");
        assert!(err.is_rate_limit());
    }
}
