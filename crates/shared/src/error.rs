use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    #[default]
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            400 | 409 | 422 => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        }
    }
}

/// Error body the portal API sends with non-success statuses:
/// `{"success": false, "message": "...", "error": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A non-success response from the portal API.
///
/// `message` is only set when the server supplied one.
#[derive(Debug, Clone, Error)]
#[error("{code:?} (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
pub struct ApiException {
    pub status: u16,
    pub code: ErrorCode,
    pub message: Option<String>,
    pub details: Option<String>,
}

impl ApiException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            message: Some(message.into()),
            details: None,
        }
    }

    pub fn from_body(status: u16, body: ApiErrorBody) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            message: body.message.filter(|m| !m.trim().is_empty()),
            details: body.error,
        }
    }
}

impl From<ApiException> for ApiErrorBody {
    fn from(value: ApiException) -> Self {
        Self {
            message: value.message,
            error: value.details,
        }
    }
}
