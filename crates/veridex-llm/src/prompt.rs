//! Prompt construction — raw input text → structured classification request.
//!
//! The instruction template is a single versioned constant. Changing the
//! criteria or the output contract means bumping `PROMPT_VERSION` in review,
//! not editing strings at call sites.

use serde::{Deserialize, Serialize};

use crate::backend::Message;

/// Bumped whenever the template below changes shape or criteria.
pub const PROMPT_VERSION: &str = "v1";

const SYSTEM_PROMPT: &str = "You are an expert fact-checker and misinformation analyst \
using a systematic framework to evaluate news content.";

/// One structured request per analysis. Read-only after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSpec {
    version: String,
    input_text: String,
    messages: Vec<Message>,
}

impl PromptSpec {
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The original (trimmed) input text, for providers that take raw text
    /// instead of a chat payload.
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// Build the classification request for `text`. Pure and total: no I/O,
/// no failure path — input validation happens before this stage.
pub fn build(text: &str) -> PromptSpec {
    let user = format!(
        r#"## Your Task:
Analyze the following text to determine if it's likely REAL news or FAKE news.

## Evaluation Criteria:
1. SOURCE CREDIBILITY:
   - Does it mention or cite established sources?
   - Are experts quoted with proper credentials?

2. LANGUAGE ASSESSMENT:
   - Is it using sensationalist, emotional language?
   - Does it use excessive ALL CAPS, exclamation points, or clickbait techniques?
   - Does it use partisan or loaded terms designed to trigger emotional responses?

3. FACTUAL INTEGRITY:
   - Are specific facts, figures, dates, and locations provided?
   - Can these details be potentially verified?
   - Are there internal inconsistencies or implausible claims?

4. CONTEXTUALIZATION:
   - Is the story presented with appropriate context?
   - Does it acknowledge complexity rather than present oversimplified narratives?

5. JOURNALISTIC STANDARDS:
   - Does it separate facts from opinions?
   - Does it present multiple perspectives on contested issues?
   - Does it show signs of having gone through editorial review?

## Content to Analyze:
"""
{text}
"""

## Instructions:
1. You must classify this as either "Real" or "Fake" based on your analysis
2. Provide a confidence score between 0-1 (e.g., 0.87)
3. Include brief reasoning for your classification (1-3 sentences)
4. Return ONLY a valid JSON object with the following structure:
{{
  "label": "Real" or "Fake",
  "confidence": [number between 0-1],
  "reasoning": "[your brief explanation]"
}}"#
    );

    PromptSpec {
        version: PROMPT_VERSION.to_string(),
        input_text: text.to_string(),
        messages: vec![
            Message { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
            Message { role: "user".to_string(), content: user },
        ],
    }
}
