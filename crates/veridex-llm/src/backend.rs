//! Classifier backend trait and concrete implementations.
//!
//! Backends:
//!   OpenAiBackend           — OpenAI chat completions API
//!   OpenAiCompatibleBackend — any OpenAI-compatible endpoint (LMStudio,
//!                             Groq, OpenRouter, vLLM, …)
//!   OllamaBackend           — local Ollama (OpenAI-compatible)
//!   HuggingFaceBackend      — HF inference API, returns label/score arrays
//!
//! One network call per `classify` invocation. Retry is a policy decision
//! that belongs to callers, never to a backend.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompt::PromptSpec;

/// Classification wants reproducible verdicts, not creative variation.
pub const TEMPERATURE: f32 = 0.1;
/// Hard output cap — bounds both cost and the parsing surface.
pub const MAX_OUTPUT_TOKENS: u32 = 512;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Authentication rejected [{status}]: {message}")]
    Auth { status: u16, message: String },
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("Provider did not respond within {0}s")]
    Timeout(u64),
    #[error("Provider returned no content")]
    EmptyReply,
    #[error("Provider reply violates the output contract: {0}")]
    Schema(String),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
}

// ── Request / Reply shapes ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String, // "system" | "user" | "assistant"
    pub content: String,
}

/// A single completion message from a chat-style provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// One candidate from a label/score classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Tagged union of the provider reply shapes we know how to validate.
/// Owned by the backend for the duration of one call; the validator turns
/// it into the canonical `AnalysisResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProviderReply {
    SingleCompletion(Completion),
    LabelScores(Vec<LabelScore>),
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Issue exactly one classification call. `model` overrides the
    /// backend's configured model when set (fallback selection).
    async fn classify(
        &self,
        spec: &PromptSpec,
        model: Option<&str>,
    ) -> Result<ProviderReply, ProviderError>;

    fn model_id(&self) -> &str;
    fn is_local(&self) -> bool;
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Map a transport-level send failure. reqwest reports our client-side
/// timeout as `is_timeout`; connection resets stay `Http` and are picked
/// up by the error classifier.
fn transport_error(err: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::Http(err)
    }
}

fn api_message(body: &serde_json::Value) -> String {
    body["error"]["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .or_else(|| body["message"].as_str())
        .unwrap_or("unknown API error")
        .to_string()
}

async fn check_response_status(
    resp: reqwest::Response,
) -> Result<serde_json::Value, ProviderError> {
    let status = resp.status().as_u16();
    let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
    match status {
        401 | 403 => Err(ProviderError::Auth { status, message: api_message(&body) }),
        429 => Err(ProviderError::RateLimited(api_message(&body))),
        s if s >= 400 => Err(ProviderError::Api { status, message: api_message(&body) }),
        _ => Ok(body),
    }
}

fn parse_openai_reply(
    json: &serde_json::Value,
    fallback_model: &str,
) -> Result<ProviderReply, ProviderError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string();
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyReply);
    }
    Ok(ProviderReply::SingleCompletion(Completion {
        content,
        model: json["model"].as_str().unwrap_or(fallback_model).to_string(),
        prompt_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }))
}

fn chat_body(spec: &PromptSpec, model: &str) -> serde_json::Value {
    serde_json::json!({
        "model":       model,
        "messages":    spec.messages(),
        "max_tokens":  MAX_OUTPUT_TOKENS,
        "temperature": TEMPERATURE,
    })
}

// ── 1. OpenAI ─────────────────────────────────────────────────────────────────

pub struct OpenAiBackend {
    pub model: String,
    api_key: SecretString,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OpenAiBackend {
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            model: model.into(),
            api_key,
            client: http_client(timeout)?,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl ClassifierBackend for OpenAiBackend {
    async fn classify(
        &self,
        spec: &PromptSpec,
        model: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        let model = model.unwrap_or(&self.model);
        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(self.api_key.expose_secret())
            .json(&chat_body(spec, model))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        let json = check_response_status(resp).await?;
        parse_openai_reply(&json, model)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
    fn is_local(&self) -> bool {
        false
    }
}

// ── 2. OpenAI-compatible (LMStudio, Groq, OpenRouter, vLLM, …) ───────────────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: http_client(timeout)?,
            timeout_secs: timeout.as_secs(),
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(k) => req.bearer_auth(k.expose_secret()),
            None => req,
        }
    }
}

#[async_trait]
impl ClassifierBackend for OpenAiCompatibleBackend {
    async fn classify(
        &self,
        spec: &PromptSpec,
        model: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        let model = model.unwrap_or(&self.model);
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .auth(self.client.post(&url))
            .json(&chat_body(spec, model))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        let json = check_response_status(resp).await?;
        parse_openai_reply(&json, model)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
    fn is_local(&self) -> bool {
        false
    }
}

// ── 3. Ollama (local) ─────────────────────────────────────────────────────────

pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl OllamaBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            client: http_client(timeout)?,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl ClassifierBackend for OllamaBackend {
    async fn classify(
        &self,
        spec: &PromptSpec,
        model: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        let model = model.unwrap_or(&self.model);
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .json(&chat_body(spec, model))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        let json = check_response_status(resp).await?;
        parse_openai_reply(&json, model)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
    fn is_local(&self) -> bool {
        true
    }
}

// ── 4. HuggingFace inference API ──────────────────────────────────────────────

/// Sends the raw input text (not the chat prompt) to a text-classification
/// model such as `roberta-base-openai-detector` and receives label/score
/// candidates.
pub struct HuggingFaceBackend {
    pub base_url: String,
    pub model: String,
    api_key: SecretString,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HuggingFaceBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: http_client(timeout)?,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl ClassifierBackend for HuggingFaceBackend {
    async fn classify(
        &self,
        spec: &PromptSpec,
        model: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        let model = model.unwrap_or(&self.model);
        let url = format!("{}/models/{}", self.base_url.trim_end_matches('/'), model);
        let body = serde_json::json!({ "inputs": spec.input_text() });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;
        let json = check_response_status(resp).await?;

        // A still-loading model answers 200 with {"error": "..."}
        if let Some(msg) = json["error"].as_str() {
            return Err(ProviderError::Api { status: 200, message: msg.to_string() });
        }

        // Replies come as [{label, score}, …] or nested [[{label, score}, …]]
        let candidates = match &json {
            serde_json::Value::Array(outer) => match outer.first() {
                Some(serde_json::Value::Array(_)) => outer[0].clone(),
                Some(_) => json.clone(),
                None => return Err(ProviderError::EmptyReply),
            },
            _ => {
                return Err(ProviderError::Schema(
                    "expected a label/score array from the inference API".to_string(),
                ))
            }
        };
        let scores: Vec<LabelScore> = serde_json::from_value(candidates)?;
        if scores.is_empty() {
            return Err(ProviderError::EmptyReply);
        }
        Ok(ProviderReply::LabelScores(scores))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
    fn is_local(&self) -> bool {
        false
    }
}

// ── 5. Unconfigured placeholder ───────────────────────────────────────────────

/// Stands in for a key-requiring backend when no API key is configured.
/// The server still starts and the health endpoint reports the missing
/// credential; any analysis attempt fails with an auth error instead.
pub struct UnconfiguredBackend {
    pub model: String,
    api_key_env: String,
}

impl UnconfiguredBackend {
    pub fn new(model: impl Into<String>, api_key_env: impl Into<String>) -> Self {
        Self { model: model.into(), api_key_env: api_key_env.into() }
    }
}

#[async_trait]
impl ClassifierBackend for UnconfiguredBackend {
    async fn classify(
        &self,
        _spec: &PromptSpec,
        _model: Option<&str>,
    ) -> Result<ProviderReply, ProviderError> {
        Err(ProviderError::Auth {
            status: 401,
            message: format!(
                "provider API key not configured: set the {} environment variable",
                self.api_key_env
            ),
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
    fn is_local(&self) -> bool {
        false
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
