//! Canonical analysis result — the only structure crossing the core/client boundary.

use serde::{Deserialize, Serialize};

/// Sentinel used when the provider omits reasoning. Never an empty string,
/// so downstream rendering can always show something.
pub const NO_REASONING: &str = "No detailed reasoning provided";

/// Categorical verdict on a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Real,
    Fake,
    /// The provider answered with a well-formed reply carrying a label
    /// we do not recognize. Recoverable data, not a contract failure.
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real    => "Real",
            Verdict::Fake    => "Fake",
            Verdict::Unknown => "Unknown",
        }
    }

    /// Case-insensitive parse; anything unrecognized degrades to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "real" => Verdict::Real,
            "fake" => Verdict::Fake,
            _      => Verdict::Unknown,
        }
    }
}

/// Provider-agnostic classification result. Immutable; lives for one
/// request/response cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub label: Verdict,
    /// Provider-reported certainty in [0,1]. Preserved exactly as received;
    /// out-of-range values are rejected upstream, never clamped here.
    pub confidence: f64,
    pub reasoning: String,
}

impl AnalysisResult {
    pub fn new(label: Verdict, confidence: f64, reasoning: impl Into<String>) -> Self {
        Self { label, confidence, reasoning: reasoning.into() }
    }
}
