/// LLM Client: the single point of entry for all generative text calls.
///
/// ARCHITECTURAL RULE: No other module may call a model provider directly.
/// Engines hold an `LlmClient`, which bounds every call with the configured
/// timeout and delegates to a `TextGenerationPort` chosen by provider id.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod prompts;
pub mod structured;
#[cfg(test)]
pub mod testing;

pub use structured::OutputSchema;

/// Attempts made by `generate_structured` when the output fails to parse.
pub const STRUCTURED_ATTEMPTS: u32 = 3;
/// Temperature used for schema-constrained calls.
pub const STRUCTURED_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM backend unavailable: {0}")]
    Unavailable(String),

    #[error("No balanced JSON object in LLM output")]
    NoJsonObject,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM output does not match schema: {0}")]
    SchemaMismatch(String),
}

/// Coarse error taxonomy used by callers when deciding on a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Backend unreachable, non-success response, or timeout.
    Generation,
    /// Structured output malformed or schema non-conformant.
    SchemaParse,
}

impl LlmError {
    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::NoJsonObject | LlmError::Parse(_) | LlmError::SchemaMismatch(_) => {
                LlmErrorKind::SchemaParse
            }
            LlmError::Http(_)
            | LlmError::Api { .. }
            | LlmError::RateLimited { .. }
            | LlmError::EmptyContent
            | LlmError::Timeout(_)
            | LlmError::Unavailable(_) => LlmErrorKind::Generation,
        }
    }
}

/// One free-text generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub system: Option<&'a str>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Capability interface to a generative text backend.
#[async_trait]
pub trait TextGenerationPort: Send + Sync {
    /// Provider identifier, e.g. "openai".
    fn provider(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, LlmError>;

    /// Generates a JSON object conforming to `schema`.
    ///
    /// Backend errors return immediately; parse failures are retried up to
    /// `STRUCTURED_ATTEMPTS` times before the last parse error is returned.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
        system: Option<&str>,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let formatted = prompts::structured_prompt(prompt, schema.schema());
        let system = prompts::structured_system(system);
        let mut last_error = LlmError::NoJsonObject;

        for attempt in 1..=STRUCTURED_ATTEMPTS {
            let raw = self
                .generate(&GenerationRequest {
                    prompt: &formatted,
                    system: Some(&system),
                    temperature,
                    max_tokens: None,
                })
                .await?;

            match structured::parse_structured(&raw, schema) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        "Structured output attempt {}/{} from {} failed: {}",
                        attempt,
                        STRUCTURED_ATTEMPTS,
                        self.provider(),
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    Anthropic,
    /// No backend; every call fails and callers take their fallback path.
    Offline,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Offline => "offline",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "offline" | "none" => Ok(ProviderKind::Offline),
            other => Err(anyhow!("Unknown LLM provider type: {other}")),
        }
    }
}

/// Backend selection and call limits.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Offline,
            model: None,
            api_key: None,
            api_base: None,
            timeout: Duration::from_secs(60),
            max_tokens: 1000,
            temperature: 0.2,
        }
    }
}

/// Builds the port registered for `settings.provider`.
pub fn build_port(settings: &LlmSettings) -> Result<Arc<dyn TextGenerationPort>> {
    let port: Arc<dyn TextGenerationPort> = match settings.provider {
        ProviderKind::OpenAi => Arc::new(openai::OpenAiPort::new(settings)?),
        ProviderKind::Ollama => Arc::new(ollama::OllamaPort::new(settings)?),
        ProviderKind::Anthropic => Arc::new(anthropic::AnthropicPort::new(settings)?),
        ProviderKind::Offline => Arc::new(OfflinePort),
    };
    Ok(port)
}

/// Port that never reaches a backend.
pub struct OfflinePort;

#[async_trait]
impl TextGenerationPort for OfflinePort {
    fn provider(&self) -> &'static str {
        "offline"
    }

    async fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, LlmError> {
        Err(LlmError::Unavailable(
            "offline provider configured".to_string(),
        ))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client wrapper
// ────────────────────────────────────────────────────────────────────────────

/// The LLM client shared by the extraction engine and the content synthesizer.
#[derive(Clone)]
pub struct LlmClient {
    port: Arc<dyn TextGenerationPort>,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl LlmClient {
    pub fn new(port: Arc<dyn TextGenerationPort>, settings: &LlmSettings) -> Self {
        Self {
            port,
            timeout: settings.timeout,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.port.provider()
    }

    /// Free-text generation at the configured temperature.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        let request = GenerationRequest {
            prompt,
            system,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };
        let text = tokio::time::timeout(self.timeout, self.port.generate(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        debug!(
            "{} generate returned {} chars",
            self.provider(),
            text.len()
        );
        Ok(text)
    }

    /// Schema-constrained generation. The whole attempt loop shares one timeout.
    pub async fn generate_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
        system: Option<&str>,
    ) -> Result<Value, LlmError> {
        tokio::time::timeout(
            self.timeout,
            self.port
                .generate_structured(prompt, schema, system, STRUCTURED_TEMPERATURE),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout))?
    }

    /// Convenience method that deserializes the validated object into `T`.
    pub async fn generate_structured_as<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: &OutputSchema,
        system: Option<&str>,
    ) -> Result<T, LlmError> {
        let value = self.generate_structured(prompt, schema, system).await?;
        serde_json::from_value(value).map_err(LlmError::Parse)
    }
}
