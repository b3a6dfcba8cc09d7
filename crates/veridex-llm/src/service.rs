//! Analysis service — the single `analyze` operation callers see.
//!
//! Stateless and `Arc`-shareable; concurrent invocations never contend.
//! At most one provider call per invocation — callers that want retry on
//! transient failures re-invoke explicitly, so cost and latency stay
//! visible to them.

use std::sync::Arc;
use std::time::Instant;

use veridex_common::{AnalysisError, AnalysisResult};

use crate::audit::AuditEntry;
use crate::backend::ClassifierBackend;
use crate::config::ProviderConfig;
use crate::{classify, prompt, validate};

/// Minimum trimmed input length. Anything shorter is rejected before a
/// prompt is built or a network call is issued.
pub const MIN_TEXT_LEN: usize = 10;

pub struct AnalysisService {
    backend: Arc<dyn ClassifierBackend>,
    model: String,
    fallback_model: Option<String>,
    use_fallback_model: bool,
}

impl AnalysisService {
    pub fn new(backend: Arc<dyn ClassifierBackend>, provider: &ProviderConfig) -> Self {
        Self {
            backend,
            model: provider.model.clone(),
            fallback_model: provider.fallback_model.clone(),
            use_fallback_model: provider.use_fallback_model,
        }
    }

    /// The model for this invocation: the configured fallback when the
    /// fast/test-mode trigger is set, otherwise the primary.
    fn model(&self) -> &str {
        if self.use_fallback_model {
            if let Some(fallback) = &self.fallback_model {
                return fallback;
            }
        }
        &self.model
    }

    pub async fn analyze(&self, raw_text: &str) -> Result<AnalysisResult, AnalysisError> {
        let text = raw_text.trim();
        if text.chars().count() < MIN_TEXT_LEN {
            return Err(AnalysisError::validation(format!(
                "Text must be at least {MIN_TEXT_LEN} characters long"
            )));
        }

        let spec = prompt::build(text);
        let model = self.model();

        let started = Instant::now();
        let reply = self
            .backend
            .classify(&spec, Some(model))
            .await
            .map_err(classify::classify)?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let entry = AuditEntry::record(model, spec.version(), &reply, latency_ms);
        tracing::info!(
            model,
            prompt_version = spec.version(),
            latency_ms,
            output_hash = %entry.output_hash,
            "provider call complete"
        );

        let result = validate::validate(&reply).map_err(classify::classify)?;
        tracing::info!(
            label = result.label.as_str(),
            confidence = result.confidence,
            "analysis complete"
        );
        Ok(result)
    }
}
