//! Test doubles for `TextGenerationPort`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationRequest, LlmError, TextGenerationPort};

type Script = dyn Fn(&GenerationRequest<'_>) -> Result<String, LlmError> + Send + Sync;

/// Answers each call with the result of a closure over the request.
pub struct ScriptedPort {
    script: Box<Script>,
}

impl ScriptedPort {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&GenerationRequest<'_>) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
        }
    }
}

#[async_trait]
impl TextGenerationPort for ScriptedPort {
    fn provider(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, LlmError> {
        (self.script)(request)
    }
}

/// Always fails with a backend error and counts the calls it received.
#[derive(Default)]
pub struct FailingPort {
    calls: AtomicU32,
}

impl FailingPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerationPort for FailingPort {
    fn provider(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Api {
            status: 503,
            message: "backend down".to_string(),
        })
    }
}

/// Sleeps before answering; used with paused tokio time.
pub struct SlowPort(pub Duration);

#[async_trait]
impl TextGenerationPort for SlowPort {
    fn provider(&self) -> &'static str {
        "slow"
    }

    async fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, LlmError> {
        tokio::time::sleep(self.0).await;
        Ok("late".to_string())
    }
}
