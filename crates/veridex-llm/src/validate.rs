//! Structural validation of provider replies into the canonical result.
//!
//! The provider is opaque and occasionally wrong; everything it sends is
//! checked here, at the boundary, before anything crosses into callers.

use veridex_common::{AnalysisResult, Verdict, NO_REASONING};

use crate::backend::{LabelScore, ProviderError, ProviderReply};

/// Parse and validate a provider reply.
///
/// Fails with `ProviderError::Schema` when the reply cannot be parsed as
/// the mandated JSON object or carries an out-of-contract confidence.
/// An unrecognized but well-formed label degrades to `Unknown`/0 instead
/// of failing — that is recoverable data, not a contract violation.
pub fn validate(reply: &ProviderReply) -> Result<AnalysisResult, ProviderError> {
    match reply {
        ProviderReply::SingleCompletion(c) => validate_completion(&c.content),
        ProviderReply::LabelScores(candidates) => validate_label_scores(candidates),
    }
}

fn validate_completion(content: &str) -> Result<AnalysisResult, ProviderError> {
    let payload = extract_json_object(content).ok_or_else(|| {
        ProviderError::Schema("completion contains no JSON object".to_string())
    })?;
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| ProviderError::Schema(format!("completion is not valid JSON: {e}")))?;

    let label = value["label"]
        .as_str()
        .ok_or_else(|| ProviderError::Schema("`label` missing or not a string".to_string()))?;

    let confidence = value["confidence"]
        .as_f64()
        .ok_or_else(|| ProviderError::Schema("`confidence` missing or not numeric".to_string()))?;
    check_confidence_range(confidence)?;

    let reasoning = value["reasoning"]
        .as_str()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(NO_REASONING)
        .to_string();

    Ok(normalize(label, confidence, reasoning))
}

fn validate_label_scores(candidates: &[LabelScore]) -> Result<AnalysisResult, ProviderError> {
    // Best-scoring entry wins; ties keep the first-seen candidate.
    let best = candidates
        .iter()
        .reduce(|best, c| if c.score > best.score { c } else { best })
        .ok_or(ProviderError::EmptyReply)?;
    check_confidence_range(best.score)?;
    Ok(normalize(&best.label, best.score, NO_REASONING.to_string()))
}

/// Out-of-range confidence signals a provider contract violation and is
/// surfaced, never clamped.
fn check_confidence_range(confidence: f64) -> Result<(), ProviderError> {
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ProviderError::Schema(format!(
            "`confidence` {confidence} outside [0,1]"
        )));
    }
    Ok(())
}

fn normalize(label: &str, confidence: f64, reasoning: String) -> AnalysisResult {
    match Verdict::from_label(label) {
        Verdict::Unknown => AnalysisResult::new(Verdict::Unknown, 0.0, reasoning),
        verdict => AnalysisResult::new(verdict, confidence, reasoning),
    }
}

/// Locate the JSON object inside a completion, tolerating prose or a
/// markdown code fence around it.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Completion;

    fn completion(content: &str) -> ProviderReply {
        ProviderReply::SingleCompletion(Completion {
            content: content.to_string(),
            model: "test-model".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    #[test]
    fn test_valid_reply_preserves_confidence_exactly() {
        let reply = completion(r#"{"label":"Real","confidence":0.9137,"reasoning":"Cites a journal."}"#);
        let result = validate(&reply).unwrap();
        assert_eq!(result.label, Verdict::Real);
        assert_eq!(result.confidence, 0.9137);
        assert_eq!(result.reasoning, "Cites a journal.");
    }

    #[test]
    fn test_out_of_range_confidence_is_schema_error_not_clamped() {
        let reply = completion(r#"{"label":"Real","confidence":1.4,"reasoning":"x"}"#);
        assert!(matches!(validate(&reply), Err(ProviderError::Schema(_))));
    }

    #[test]
    fn test_missing_label_is_schema_error() {
        let reply = completion(r#"{"confidence":0.8,"reasoning":"x"}"#);
        assert!(matches!(validate(&reply), Err(ProviderError::Schema(_))));
    }

    #[test]
    fn test_non_numeric_confidence_is_schema_error() {
        let reply = completion(r#"{"label":"Fake","confidence":"high"}"#);
        assert!(matches!(validate(&reply), Err(ProviderError::Schema(_))));
    }

    #[test]
    fn test_missing_reasoning_gets_sentinel() {
        let reply = completion(r#"{"label":"Fake","confidence":0.75}"#);
        let result = validate(&reply).unwrap();
        assert_eq!(result.reasoning, NO_REASONING);
    }

    #[test]
    fn test_unrecognized_label_degrades_to_unknown_zero() {
        let reply = completion(r#"{"label":"Satire","confidence":0.6,"reasoning":"odd"}"#);
        let result = validate(&reply).unwrap();
        assert_eq!(result.label, Verdict::Unknown);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_markdown_fenced_json_is_accepted() {
        let reply = completion(
            "```json\n{\"label\":\"Real\",\"confidence\":0.88,\"reasoning\":\"ok\"}\n```",
        );
        let result = validate(&reply).unwrap();
        assert_eq!(result.label, Verdict::Real);
        assert_eq!(result.confidence, 0.88);
    }

    #[test]
    fn test_completion_without_json_is_schema_error() {
        let reply = completion("I think this article is probably real.");
        assert!(matches!(validate(&reply), Err(ProviderError::Schema(_))));
    }

    #[test]
    fn test_label_scores_selects_best_entry() {
        let reply = ProviderReply::LabelScores(vec![
            LabelScore { label: "Fake".to_string(), score: 0.2 },
            LabelScore { label: "Real".to_string(), score: 0.9 },
        ]);
        let result = validate(&reply).unwrap();
        assert_eq!(result.label, Verdict::Real);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.reasoning, NO_REASONING);
    }

    #[test]
    fn test_label_scores_ties_keep_first_seen() {
        let reply = ProviderReply::LabelScores(vec![
            LabelScore { label: "Fake".to_string(), score: 0.5 },
            LabelScore { label: "Real".to_string(), score: 0.5 },
        ]);
        let result = validate(&reply).unwrap();
        assert_eq!(result.label, Verdict::Fake);
    }

    #[test]
    fn test_empty_label_scores_is_empty_reply() {
        let reply = ProviderReply::LabelScores(vec![]);
        assert!(matches!(validate(&reply), Err(ProviderError::EmptyReply)));
    }
}
