use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::generation::fit_scoring::WeightedFitScorer;
use crate::generation::generator::ContentSynthesizer;
use crate::generation::jd_parser::ExtractionEngine;
use crate::generation::pipeline::ResumePipeline;
use crate::llm_client::{build_port, LlmClient, TextGenerationPort};
use crate::render::{JsonRenderer, ResumeRenderer};
use crate::store::{InMemoryResumeStore, ResumeStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResumePipeline>,
    /// Persistence collaborator. Default: InMemoryResumeStore.
    pub store: Arc<dyn ResumeStore>,
    /// Rendering collaborator. Default: JsonRenderer under RESUME_DIR.
    pub renderer: Arc<dyn ResumeRenderer>,
    pub config: Config,
}

impl AppState {
    /// Wires the configured provider into every component.
    pub fn from_config(config: Config) -> Result<Self> {
        let port = build_port(&config.llm)?;
        Self::with_port(config, port)
    }

    pub fn with_port(config: Config, port: Arc<dyn TextGenerationPort>) -> Result<Self> {
        let llm = LlmClient::new(port, &config.llm);
        let pipeline = ResumePipeline::new(
            ExtractionEngine::new(llm.clone(), &config.extraction)?,
            Arc::new(WeightedFitScorer::new(config.scoring.clone())),
            ContentSynthesizer::new(llm, config.synthesis.clone()),
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            store: Arc::new(InMemoryResumeStore::new()),
            renderer: Arc::new(JsonRenderer::new(config.resume_dir.clone())),
            config,
        })
    }
}
