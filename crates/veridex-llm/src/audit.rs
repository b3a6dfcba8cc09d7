//! Audit records for provider calls.
//!
//! One entry per completed call; the output is hashed rather than stored,
//! so the audit trail never retains article text or provider output.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::ProviderReply;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub model: String,
    pub prompt_version: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl AuditEntry {
    pub fn record(
        model: impl Into<String>,
        prompt_version: impl Into<String>,
        reply: &ProviderReply,
        latency_ms: u64,
    ) -> Self {
        let output = match reply {
            ProviderReply::SingleCompletion(c) => c.content.clone(),
            ProviderReply::LabelScores(scores) => {
                serde_json::to_string(scores).unwrap_or_default()
            }
        };
        let (prompt_tokens, completion_tokens) = match reply {
            ProviderReply::SingleCompletion(c) => (c.prompt_tokens, c.completion_tokens),
            ProviderReply::LabelScores(_) => (0, 0),
        };

        let mut hasher = Sha256::new();
        hasher.update(output.as_bytes());
        let output_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            model: model.into(),
            prompt_version: prompt_version.into(),
            prompt_tokens,
            completion_tokens,
            output_hash,
            latency_ms,
            called_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Completion;

    #[test]
    fn test_entry_hashes_output_instead_of_storing_it() {
        let reply = ProviderReply::SingleCompletion(Completion {
            content: r#"{"label":"Real","confidence":0.9}"#.to_string(),
            model: "gpt-4o-mini".to_string(),
            prompt_tokens: 100,
            completion_tokens: 20,
        });
        let entry = AuditEntry::record("gpt-4o-mini", "v1", &reply, 412);
        assert_eq!(entry.output_hash.len(), 64);
        assert_eq!(entry.prompt_tokens, 100);
        assert_eq!(entry.completion_tokens, 20);
        assert_eq!(entry.latency_ms, 412);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("Real"));
    }
}
