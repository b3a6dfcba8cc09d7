use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Actionable failure categories. Everything the pipeline can fail with
/// maps into exactly one of these before it reaches a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input contract violated — client-correctable.
    ValidationError,
    /// Misconfigured or invalid provider credential — operator-correctable.
    AuthError,
    /// Provider usage limit exceeded — retry later.
    QuotaError,
    /// Transient network or provider latency — retryable.
    TimeoutError,
    /// Provider reply violates the mandated output contract — not
    /// retryable without a prompt or provider change.
    SchemaError,
    /// Catch-all; full detail is retained for diagnostics.
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::AuthError       => "auth_error",
            ErrorKind::QuotaError      => "quota_error",
            ErrorKind::TimeoutError    => "timeout_error",
            ErrorKind::SchemaError     => "schema_error",
            ErrorKind::UnknownError    => "unknown_error",
        }
    }

    /// Whether an identical re-invocation has a reasonable chance of success.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::QuotaError | ErrorKind::TimeoutError)
    }
}

/// Classified pipeline failure. `message` is sanitized for end-user
/// display; `detail` carries the raw cause for diagnostic logging only.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AnalysisError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl AnalysisError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }
}
