//! veridex-common — Shared types and the error taxonomy used across all Veridex crates.

pub mod error;
pub mod result;

// Re-export commonly used types
pub use error::{AnalysisError, ErrorKind};
pub use result::{AnalysisResult, Verdict, NO_REASONING};
