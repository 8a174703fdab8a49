// Resume pipeline: requirement extraction, fit scoring, experience ranking,
// content synthesis.
// All LLM calls go through llm_client; every call site here owns a deterministic fallback.

pub mod content_selector;
pub mod fit_scoring;
pub mod generator;
pub mod handlers;
pub mod jd_parser;
pub mod pipeline;
pub mod prompts;
pub mod rules;
pub mod vocabulary;
