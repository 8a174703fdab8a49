//! Local Ollama backend (`/api/generate`, non-streaming).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GenerationRequest, LlmError, LlmSettings, TextGenerationPort};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:8b-instruct";

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

pub struct OllamaPort {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaPort {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl TextGenerationPort for OllamaPort {
    fn provider(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, LlmError> {
        let body = OllamaRequest {
            model: &self.model,
            prompt: request.prompt,
            system: request.system.unwrap_or(""),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Ollama returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaResponse = response.json().await?;
        if parsed.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("Ollama call succeeded with model {}", self.model);
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = OllamaRequest {
            model: "llama3",
            prompt: "p",
            system: "",
            stream: false,
            options: OllamaOptions {
                temperature: 0.1,
                num_predict: Some(200),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 200);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let settings = LlmSettings {
            api_base: Some("http://gpu-box:11434/".into()),
            ..LlmSettings::default()
        };
        let port = OllamaPort::new(&settings).unwrap();
        assert_eq!(port.base_url, "http://gpu-box:11434");
        assert_eq!(port.model, DEFAULT_MODEL);
    }
}
