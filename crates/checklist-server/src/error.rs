//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use checklist_core::error::{ChecklistError, ErrorCode};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unsupported_media(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ChecklistError> for ApiError {
    fn from(err: ChecklistError) -> Self {
        let status = match &err {
            ChecklistError::Read { code, .. } if *code == ErrorCode::ReadUnsupportedFormat => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ChecklistError::Read { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ChecklistError::Configuration(_) | ChecklistError::UnsupportedProvider { .. } => {
                StatusCode::BAD_REQUEST
            }
            ChecklistError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ChecklistError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            ChecklistError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ChecklistError::ModelUnavailable { .. }
            | ChecklistError::Backend { .. }
            | ChecklistError::AllModelsFailed { .. }
            | ChecklistError::Network { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let api = ApiError::new(status, err.code().as_str(), err.to_string());
        match err.suggestion() {
            Some(hint) => api.with_details(serde_json::json!({ "suggestion": hint })),
            None => api,
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
