//! Configuration loading for Veridex.
//! Reads veridex.toml from the current directory or the path in the
//! VERIDEX_CONFIG env var; a missing file falls back to defaults so the
//! service can run from environment variables alone.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::backend::{
    ClassifierBackend, HuggingFaceBackend, OllamaBackend, OpenAiBackend,
    OpenAiCompatibleBackend, UnconfiguredBackend,
};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5050 }
fn default_environment() -> String { "development".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// One of "openai", "openai_compatible", "ollama", "huggingface".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Required for "openai_compatible"; defaulted for "ollama" and
    /// "huggingface".
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Cheaper/faster model used when `use_fallback_model` is set.
    #[serde(default = "default_fallback_model")]
    pub fallback_model: Option<String>,
    /// Explicit trigger for the fallback model (fast/test mode).
    #[serde(default)]
    pub use_fallback_model: bool,
    /// Hard bound on one provider round trip. The pipeline's own policy,
    /// not the HTTP library default.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the env var holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

fn default_backend() -> String { "openai".to_string() }
fn default_model() -> String { "gpt-4o".to_string() }
fn default_fallback_model() -> Option<String> { Some("gpt-4o-mini".to_string()) }
fn default_timeout_secs() -> u64 { 30 }
fn default_api_key_env() -> String { "VERIDEX_API_KEY".to_string() }

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: None,
            model: default_model(),
            fallback_model: default_fallback_model(),
            use_fallback_model: false,
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration, then pick up the API key from the environment.
    /// A missing key is not fatal here — it is surfaced by the health
    /// endpoint and fails at backend construction for backends that
    /// require one.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("VERIDEX_CONFIG")
            .unwrap_or_else(|_| "veridex.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            tracing::warn!(path = %path, "config file not found, using defaults");
            Config::default()
        };

        config.provider.api_key = std::env::var(&config.provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);
        Ok(config)
    }

    pub fn api_key_configured(&self) -> bool {
        self.provider.api_key.is_some()
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Construct the configured backend. A key-requiring backend with no
    /// key does not abort startup: it builds a placeholder that fails each
    /// analysis with an auth error, so the server still binds and the
    /// health endpoint reports the missing credential. Structural config
    /// mistakes (unknown backend, missing base_url) do fail here.
    pub fn build_backend(&self) -> anyhow::Result<Arc<dyn ClassifierBackend>> {
        let timeout = self.timeout();
        match self.backend.as_str() {
            "openai" => match self.cloned_api_key() {
                Some(key) => Ok(Arc::new(OpenAiBackend::new(key, &self.model, timeout)?)),
                None => Ok(self.unconfigured()),
            },
            "openai_compatible" => {
                let base_url = self.base_url.clone().ok_or_else(|| {
                    anyhow::anyhow!("provider.base_url is required for openai_compatible")
                })?;
                Ok(Arc::new(OpenAiCompatibleBackend::new(
                    base_url,
                    &self.model,
                    self.cloned_api_key(),
                    timeout,
                )?))
            }
            "ollama" => {
                let base_url = self
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());
                Ok(Arc::new(OllamaBackend::new(base_url, &self.model, timeout)?))
            }
            "huggingface" => match self.cloned_api_key() {
                Some(key) => {
                    let base_url = self
                        .base_url
                        .clone()
                        .unwrap_or_else(|| "https://api-inference.huggingface.co".to_string());
                    Ok(Arc::new(HuggingFaceBackend::new(base_url, &self.model, key, timeout)?))
                }
                None => Ok(self.unconfigured()),
            },
            other => anyhow::bail!("unknown provider backend: {other}"),
        }
    }

    fn cloned_api_key(&self) -> Option<SecretString> {
        self.api_key
            .as_ref()
            .map(|k| SecretString::from(k.expose_secret().to_string()))
    }

    fn unconfigured(&self) -> Arc<dyn ClassifierBackend> {
        tracing::warn!(
            backend = %self.backend,
            env_var = %self.api_key_env,
            "provider API key not configured; analysis requests will fail until it is set"
        );
        Arc::new(UnconfiguredBackend::new(&self.model, &self.api_key_env))
    }
}
