use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::generation::fit_scoring::ScoringConfig;
use crate::generation::generator::SynthesisConfig;
use crate::generation::jd_parser::ExtractionConfig;
use crate::llm_client::{LlmSettings, ProviderKind};

/// Application configuration loaded from environment variables.
/// Every component gets its slice of this value at construction.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub resume_dir: String,
    pub llm: LlmSettings,
    pub extraction: ExtractionConfig,
    pub scoring: ScoringConfig,
    pub synthesis: SynthesisConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => ProviderKind::from_str(&raw)?,
            None => ProviderKind::Offline,
        };

        let defaults = LlmSettings::default();
        let llm = LlmSettings {
            provider,
            model: get("LLM_MODEL"),
            api_key: get("LLM_API_KEY"),
            api_base: get("LLM_API_BASE"),
            timeout: parse_or(&get, "LLM_TIMEOUT_SECS", defaults.timeout.as_secs())
                .map(Duration::from_secs)?,
            max_tokens: parse_or(&get, "LLM_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_or(&get, "LLM_TEMPERATURE", defaults.temperature)?,
        };

        let mut scoring = ScoringConfig::default();
        scoring.weights.skills = parse_or(&get, "SCORE_WEIGHT_SKILLS", scoring.weights.skills)?;
        scoring.weights.experience =
            parse_or(&get, "SCORE_WEIGHT_EXPERIENCE", scoring.weights.experience)?;
        scoring.weights.education =
            parse_or(&get, "SCORE_WEIGHT_EDUCATION", scoring.weights.education)?;
        scoring.skill_match_threshold =
            parse_or(&get, "SKILL_MATCH_THRESHOLD", scoring.skill_match_threshold)?;
        scoring.ranking.recency_window_years =
            parse_or(&get, "RECENCY_WINDOW_YEARS", scoring.ranking.recency_window_years)?;
        anyhow::ensure!(
            scoring.ranking.recency_window_years > 0.0,
            "RECENCY_WINDOW_YEARS must be positive"
        );

        Ok(Config {
            port: parse_or(&get, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            resume_dir: get("RESUME_DIR").unwrap_or_else(|| "resumes".to_string()),
            llm,
            extraction: ExtractionConfig::default(),
            scoring,
            synthesis: SynthesisConfig::default(),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
