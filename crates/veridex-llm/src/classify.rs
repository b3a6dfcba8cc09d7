//! Error classification — maps provider/transport failures into the small
//! taxonomy callers act on. Total: always returns, never panics.
//!
//! The user-facing `message` is fixed text per kind; the raw cause goes
//! into `detail` for diagnostic logging and never crosses to end users.

use veridex_common::{AnalysisError, ErrorKind};

use crate::backend::ProviderError;

pub fn classify(err: ProviderError) -> AnalysisError {
    let detail = err.to_string();
    let (kind, message) = match &err {
        ProviderError::Auth { .. } => (
            ErrorKind::AuthError,
            "The provider API credentials are missing or invalid.",
        ),
        ProviderError::RateLimited(_) => (
            ErrorKind::QuotaError,
            "The provider's usage limit was reached. Try again later.",
        ),
        ProviderError::Timeout(_) => (
            ErrorKind::TimeoutError,
            "The analysis request timed out. Try again.",
        ),
        ProviderError::Http(e) if e.is_timeout() || e.is_connect() => (
            ErrorKind::TimeoutError,
            "Could not reach the analysis provider. Try again.",
        ),
        ProviderError::EmptyReply | ProviderError::Schema(_) => (
            ErrorKind::SchemaError,
            "The provider returned a reply the service could not interpret.",
        ),
        ProviderError::Http(_) | ProviderError::Serde(_) | ProviderError::Api { .. } => (
            ErrorKind::UnknownError,
            "Analysis failed due to an unexpected provider error.",
        ),
    };
    AnalysisError::new(kind, message).with_detail(detail)
}
