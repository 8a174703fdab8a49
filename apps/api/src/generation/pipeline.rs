//! Pipeline: composes extraction, scoring and synthesis for one
//! (candidate, job) pair, and owns the per-job analysis cache.
//!
//! Run states move one way: NotAnalyzed → Analyzed → Matched → ResumeSynthesized.
//! Re-analysis is allowed from any state and drops everything downstream.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::generation::fit_scoring::FitScorer;
use crate::generation::generator::ContentSynthesizer;
use crate::generation::jd_parser::ExtractionEngine;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::models::match_result::MatchResult;
use crate::models::requirements::JobRequirementProfile;
use crate::models::resume::ResumeContent;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("cannot {action} a run that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Run state machine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub enum RunState {
    #[default]
    NotAnalyzed,
    Analyzed {
        requirements: Arc<JobRequirementProfile>,
    },
    Matched {
        requirements: Arc<JobRequirementProfile>,
        match_result: MatchResult,
    },
    ResumeSynthesized {
        requirements: Arc<JobRequirementProfile>,
        match_result: MatchResult,
        resume: ResumeContent,
    },
}

impl RunState {
    pub fn name(&self) -> &'static str {
        match self {
            RunState::NotAnalyzed => "not analyzed",
            RunState::Analyzed { .. } => "analyzed",
            RunState::Matched { .. } => "matched",
            RunState::ResumeSynthesized { .. } => "resume synthesized",
        }
    }

    /// Always allowed. Any match result or resume from an earlier analysis is dropped.
    pub fn analyzed(&mut self, requirements: Arc<JobRequirementProfile>) {
        *self = RunState::Analyzed { requirements };
    }

    pub fn matched(&mut self, match_result: MatchResult) -> Result<(), PipelineError> {
        match std::mem::take(self) {
            RunState::Analyzed { requirements } => {
                *self = RunState::Matched {
                    requirements,
                    match_result,
                };
                Ok(())
            }
            other => self.reject("match", other),
        }
    }

    pub fn synthesized(&mut self, resume: ResumeContent) -> Result<(), PipelineError> {
        match std::mem::take(self) {
            RunState::Matched {
                requirements,
                match_result,
            } => {
                *self = RunState::ResumeSynthesized {
                    requirements,
                    match_result,
                    resume,
                };
                Ok(())
            }
            other => self.reject("synthesize", other),
        }
    }

    /// Restores `previous` and reports the illegal transition.
    fn reject(&mut self, action: &'static str, previous: RunState) -> Result<(), PipelineError> {
        let state = previous.name();
        *self = previous;
        Err(PipelineError::InvalidTransition { action, state })
    }

    pub fn requirements(&self) -> Option<&Arc<JobRequirementProfile>> {
        match self {
            RunState::NotAnalyzed => None,
            RunState::Analyzed { requirements }
            | RunState::Matched { requirements, .. }
            | RunState::ResumeSynthesized { requirements, .. } => Some(requirements),
        }
    }

    pub fn match_result(&self) -> Option<&MatchResult> {
        match self {
            RunState::Matched { match_result, .. }
            | RunState::ResumeSynthesized { match_result, .. } => Some(match_result),
            RunState::NotAnalyzed | RunState::Analyzed { .. } => None,
        }
    }

    pub fn resume(&self) -> Option<&ResumeContent> {
        match self {
            RunState::ResumeSynthesized { resume, .. } => Some(resume),
            RunState::NotAnalyzed | RunState::Analyzed { .. } | RunState::Matched { .. } => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis cache
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub profile: Arc<JobRequirementProfile>,
    pub analyzed_at: DateTime<Utc>,
}

/// Requirement profiles keyed by job id. Entries are replaced whole, never edited.
#[derive(Default)]
pub struct AnalysisCache {
    entries: RwLock<HashMap<Uuid, CacheEntry>>,
}

impl AnalysisCache {
    pub async fn get(&self, job_id: Uuid) -> Option<CacheEntry> {
        self.entries.read().await.get(&job_id).cloned()
    }

    pub async fn store(&self, job_id: Uuid, profile: JobRequirementProfile) -> Arc<JobRequirementProfile> {
        let profile = Arc::new(profile);
        let entry = CacheEntry {
            profile: Arc::clone(&profile),
            analyzed_at: Utc::now(),
        };
        self.entries.write().await.insert(job_id, entry);
        debug!("Cached requirement profile for job {job_id}");
        profile
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub struct ResumePipeline {
    extractor: ExtractionEngine,
    scorer: Arc<dyn FitScorer>,
    synthesizer: ContentSynthesizer,
    cache: AnalysisCache,
}

impl ResumePipeline {
    pub fn new(
        extractor: ExtractionEngine,
        scorer: Arc<dyn FitScorer>,
        synthesizer: ContentSynthesizer,
    ) -> Self {
        Self {
            extractor,
            scorer,
            synthesizer,
            cache: AnalysisCache::default(),
        }
    }

    pub fn scorer_backend(&self) -> &'static str {
        self.scorer.backend()
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    /// Extracts requirements afresh and replaces the cached profile.
    ///
    /// The cache is written only after extraction completes, so a dropped call
    /// leaves it untouched.
    pub async fn analyze(&self, job: &JobPosting) -> Arc<JobRequirementProfile> {
        let profile = self.extractor.extract(job).await;
        self.cache.store(job.id, profile).await
    }

    /// The job's own analysis, else the cached one, else a fresh analysis.
    pub async fn requirements_for(&self, job: &JobPosting) -> Arc<JobRequirementProfile> {
        if let Some(analysis) = &job.analysis {
            return Arc::new(analysis.clone());
        }
        if let Some(entry) = self.cache.get(job.id).await {
            debug!(
                "Using requirement profile for job {} cached at {}",
                job.id, entry.analyzed_at
            );
            return entry.profile;
        }
        self.analyze(job).await
    }

    /// Analyzed → Matched.
    pub async fn match_candidate(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
        as_of: NaiveDate,
    ) -> Result<RunState, PipelineError> {
        let requirements = self.requirements_for(job).await;
        let result = self.scorer.score(candidate, &requirements, as_of);
        info!(
            "Matched candidate {} to job {}: {} ({:?}) via {}",
            candidate.id,
            job.id,
            result.overall_score,
            result.fit_category,
            self.scorer.backend()
        );

        let mut run = RunState::default();
        run.analyzed(requirements);
        run.matched(result)?;
        Ok(run)
    }

    /// Analyzed → Matched → ResumeSynthesized.
    pub async fn generate_resume(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
        as_of: NaiveDate,
    ) -> Result<RunState, PipelineError> {
        let mut run = self.match_candidate(candidate, job, as_of).await?;

        let resume = match (run.requirements(), run.match_result()) {
            (Some(requirements), Some(result)) => {
                self.synthesizer
                    .synthesize(candidate, job, requirements, result)
                    .await
            }
            _ => {
                return Err(PipelineError::InvalidTransition {
                    action: "synthesize",
                    state: run.name(),
                })
            }
        };
        run.synthesized(resume)?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::generation::fit_scoring::WeightedFitScorer;
    use crate::generation::generator::SynthesisConfig;
    use crate::generation::jd_parser::ExtractionConfig;
    use crate::llm_client::testing::FailingPort;
    use crate::llm_client::{LlmClient, LlmSettings, OfflinePort, TextGenerationPort};
    use crate::models::candidate::{CandidateSkill, Experience};
    use crate::models::requirements::JobLevel;

    fn pipeline(port: Arc<dyn TextGenerationPort>) -> ResumePipeline {
        let llm = LlmClient::new(port, &LlmSettings::default());
        ResumePipeline::new(
            ExtractionEngine::new(llm.clone(), &ExtractionConfig::default()).unwrap(),
            Arc::new(WeightedFitScorer::default()),
            ContentSynthesizer::new(llm, SynthesisConfig::default()),
        )
    }

    fn job(description: &str) -> JobPosting {
        JobPosting {
            id: Uuid::from_u128(7),
            title: "Senior Backend Engineer".to_string(),
            company_name: "Acme".to_string(),
            location: None,
            description: Some(description.to_string()),
            job_url: None,
            analysis: None,
        }
    }

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: Uuid::from_u128(1),
            name: Default::default(),
            title: "Backend Engineer".to_string(),
            contact: Default::default(),
            summary: Some("I build services.".to_string()),
            skills: vec![CandidateSkill {
                name: "Python".to_string(),
                years: Some(6),
                level: None,
            }],
            experiences: vec![Experience {
                company: "Initech".to_string(),
                title: "Python Engineer".to_string(),
                start_date: "2018-01".to_string(),
                end_date: None,
                description: Some("Built Python and PostgreSQL services".to_string()),
                achievements: vec!["Cut costs by 25%".to_string()],
                skills_used: vec!["Python".to_string()],
                location: None,
            }],
            education: vec![],
            certifications: vec![],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn profile(summary: &str) -> JobRequirementProfile {
        JobRequirementProfile {
            skills: vec![],
            experience_years: None,
            education: vec![],
            job_level: JobLevel::Mid,
            keywords: vec![],
            summary: summary.to_string(),
        }
    }

    fn empty_match() -> MatchResult {
        WeightedFitScorer::default().score(&candidate(), &profile(""), today())
    }

    #[test]
    fn test_transitions_are_one_way() {
        let mut run = RunState::default();
        let err = run.matched(empty_match()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InvalidTransition {
                action: "match",
                state: "not analyzed"
            }
        );
        assert!(matches!(run, RunState::NotAnalyzed));

        run.analyzed(Arc::new(profile("first")));
        run.matched(empty_match()).unwrap();
        assert!(run.match_result().is_some());
        assert!(run.matched(empty_match()).is_err());
        assert_eq!(run.name(), "matched");

        run.analyzed(Arc::new(profile("second")));
        assert_eq!(run.name(), "analyzed");
        assert!(run.match_result().is_none());
        assert_eq!(run.requirements().unwrap().summary, "second");
    }

    #[tokio::test]
    async fn test_offline_pipeline_produces_resume() {
        let port = Arc::new(FailingPort::new());
        let pipeline = pipeline(port);
        let posting = job("We need 5+ years of experience with Python and PostgreSQL.");
        let run = pipeline
            .generate_resume(&candidate(), &posting, today())
            .await
            .unwrap();

        assert_eq!(run.name(), "resume synthesized");
        let requirements = run.requirements().unwrap();
        assert_eq!(requirements.experience_years, Some(5));
        assert_eq!(requirements.job_level, JobLevel::Senior);

        let result = run.match_result().unwrap();
        assert!(result.skill_match.matched.iter().any(|m| m.job_skill == "Python"));

        let resume = run.resume().unwrap();
        assert_eq!(resume.summary, "I build services.");
        assert_eq!(resume.experience[0].achievements, vec!["Cut costs by 25%"]);
        assert_eq!(pipeline.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_requirements_prefer_job_analysis_then_cache() {
        let pipeline = pipeline(Arc::new(OfflinePort));
        let mut posting = job("Python and Docker.");

        let first = pipeline.requirements_for(&posting).await;
        let cached = pipeline.requirements_for(&posting).await;
        assert!(Arc::ptr_eq(&first, &cached));

        posting.analysis = Some(profile("from the job"));
        let own = pipeline.requirements_for(&posting).await;
        assert_eq!(own.summary, "from the job");
    }

    #[tokio::test]
    async fn test_reanalysis_replaces_cached_profile() {
        let pipeline = pipeline(Arc::new(OfflinePort));
        let mut posting = job("Python required.");
        let first = pipeline.analyze(&posting).await;
        let stamp = pipeline.cache().get(posting.id).await.unwrap().analyzed_at;

        posting.description = Some("Rust and Kafka required.".to_string());
        let second = pipeline.analyze(&posting).await;
        let entry = pipeline.cache().get(posting.id).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&entry.profile, &second));
        assert!(entry.analyzed_at >= stamp);
        let names: Vec<&str> = entry.profile.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Kafka"]);
        assert_eq!(pipeline.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_abandoned_analysis_writes_nothing() {
        let llm = LlmClient::new(
            Arc::new(crate::llm_client::testing::SlowPort(std::time::Duration::from_secs(30))),
            &LlmSettings::default(),
        );
        let pipeline = ResumePipeline::new(
            ExtractionEngine::new(llm.clone(), &ExtractionConfig::default()).unwrap(),
            Arc::new(WeightedFitScorer::default()),
            ContentSynthesizer::new(llm, SynthesisConfig::default()),
        );
        let posting = job("Python and Docker.");

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(10), pipeline.analyze(&posting)).await;
        assert!(abandoned.is_err());
        assert!(pipeline.cache().get(posting.id).await.is_none());
    }
}
