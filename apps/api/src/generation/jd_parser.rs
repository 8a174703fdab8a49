//! JD Parser: the extraction engine. Turns a job posting's title and description
//! into a `JobRequirementProfile`.
//!
//! Every sub-extraction is two-tier: a schema-constrained LLM call first, then a
//! deterministic rule from `rules`. LLM errors stop here; `extract` never fails.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::generation::prompts::{
    education_schema, experience_schema, job_level_schema, keywords_schema, skills_schema,
    ANALYSIS_SUMMARY_PROMPT_TEMPLATE, ANALYST_SYSTEM, EDUCATION_PROMPT_TEMPLATE,
    EXPERIENCE_PROMPT_TEMPLATE, JOB_LEVEL_PROMPT_TEMPLATE, KEYWORDS_PROMPT_TEMPLATE,
    MARKET_ANALYST_SYSTEM, SKILLS_PROMPT_TEMPLATE,
};
use crate::generation::rules::{self, RuleSet};
use crate::generation::vocabulary::Vocabulary;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{LlmClient, OutputSchema};
use crate::models::job::JobPosting;
use crate::models::requirements::{
    EducationRequirement, JobLevel, JobRequirementProfile, RequiredSkill, SkillCategory,
};

/// Summary recorded for postings without a description.
pub const NO_DESCRIPTION_SUMMARY: &str = "No description available for analysis.";

/// Which tier produced a value.
///
/// `Primary` is the first-choice strategy for the field (the LLM call, or a
/// strict rule that is checked before it); `Fallback` is a later deterministic tier.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Primary(T),
    Fallback(T),
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Primary(v) | Outcome::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Primary(v) | Outcome::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }

    pub fn path(&self) -> &'static str {
        match self {
            Outcome::Primary(_) => "primary",
            Outcome::Fallback(_) => "fallback",
        }
    }
}

/// Extraction tunables. Vocabularies are data so tests and deployments can swap them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub vocabulary: Vocabulary,
    /// Bytes searched on each side of a degree mention for a field of study.
    pub education_window: usize,
    pub max_keywords: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            education_window: 80,
            max_keywords: 15,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SkillsPayload {
    skills: Vec<SkillPayload>,
}

#[derive(Debug, Deserialize)]
struct SkillPayload {
    name: String,
    category: SkillCategory,
    relevance: i64,
    #[serde(default)]
    years_required: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct YearsPayload {
    years: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EducationPayload {
    education: Vec<EducationRequirement>,
}

#[derive(Debug, Deserialize)]
struct LevelPayload {
    level: JobLevel,
}

#[derive(Debug, Deserialize)]
struct KeywordsPayload {
    keywords: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

/// Output schemas for the structured sub-extractions, compiled at start-up.
#[derive(Debug)]
struct Schemas {
    skills: OutputSchema,
    experience: OutputSchema,
    education: OutputSchema,
    job_level: OutputSchema,
    keywords: OutputSchema,
}

impl Schemas {
    fn compile() -> Result<Self> {
        Ok(Self {
            skills: OutputSchema::compile(skills_schema())?,
            experience: OutputSchema::compile(experience_schema())?,
            education: OutputSchema::compile(education_schema())?,
            job_level: OutputSchema::compile(job_level_schema())?,
            keywords: OutputSchema::compile(keywords_schema())?,
        })
    }
}

pub struct ExtractionEngine {
    llm: LlmClient,
    rules: RuleSet,
    schemas: Schemas,
    max_keywords: usize,
}

impl ExtractionEngine {
    pub fn new(llm: LlmClient, config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            llm,
            schemas: Schemas::compile()?,
            rules: RuleSet::compile(
                &config.vocabulary,
                config.education_window,
                config.max_keywords,
            )?,
            max_keywords: config.max_keywords,
        })
    }

    /// Builds the full requirement profile for `job`.
    ///
    /// The five field extractions and the narrative summary run concurrently.
    /// The job level's years-bucket fallback is resolved after they join.
    pub async fn extract(&self, job: &JobPosting) -> JobRequirementProfile {
        let description = job.description_text();

        if description.is_empty() {
            warn!("Job {} has no description to analyze", job.id);
            return JobRequirementProfile {
                skills: Vec::new(),
                experience_years: None,
                education: Vec::new(),
                job_level: self
                    .rules
                    .level_from_title(&job.title)
                    .unwrap_or_else(|| JobLevel::from_years(None)),
                keywords: Vec::new(),
                summary: NO_DESCRIPTION_SUMMARY.to_string(),
            };
        }

        let (skills, years, education, level_hint, keywords, summary) = tokio::join!(
            self.extract_skills(&job.title, description),
            self.extract_experience_years(description),
            self.extract_education(description),
            self.classify_job_level(&job.title, description),
            self.extract_keywords(description),
            self.summarize(job),
        );

        let job_level = match level_hint {
            Outcome::Primary(Some(level)) => Outcome::Primary(level),
            _ => Outcome::Fallback(JobLevel::from_years(*years.value())),
        };

        info!(
            "Analyzed job {}: skills={} ({}), years={:?} ({}), education={} ({}), level={} ({}), keywords={} ({}), summary ({})",
            job.id,
            skills.value().len(),
            skills.path(),
            years.value(),
            years.path(),
            education.value().len(),
            education.path(),
            job_level.value().as_str(),
            job_level.path(),
            keywords.value().len(),
            keywords.path(),
            summary.path(),
        );

        JobRequirementProfile {
            skills: skills.into_inner(),
            experience_years: years.into_inner(),
            education: education.into_inner(),
            job_level: job_level.into_inner(),
            keywords: keywords.into_inner(),
            summary: summary.into_inner(),
        }
    }

    pub async fn extract_skills(&self, title: &str, description: &str) -> Outcome<Vec<RequiredSkill>> {
        let prompt = fill_template(
            SKILLS_PROMPT_TEMPLATE,
            &[("title", title), ("description", description)],
        );

        match self
            .llm
            .generate_structured_as::<SkillsPayload>(&prompt, &self.schemas.skills, Some(ANALYST_SYSTEM))
            .await
        {
            Ok(payload) => {
                let skills = sanitize_skills(payload.skills);
                if !skills.is_empty() {
                    return Outcome::Primary(skills);
                }
                debug!("LLM returned no skills; using vocabulary rules");
            }
            Err(e) => warn!("Skill extraction via LLM failed ({:?}): {e}", e.kind()),
        }
        Outcome::Fallback(self.rules.skills(description))
    }

    pub async fn extract_experience_years(&self, description: &str) -> Outcome<Option<u32>> {
        if let Some(years) = rules::experience_years_strict(description) {
            return Outcome::Primary(Some(years));
        }

        let prompt = fill_template(EXPERIENCE_PROMPT_TEMPLATE, &[("description", description)]);
        match self
            .llm
            .generate_structured_as::<YearsPayload>(&prompt, &self.schemas.experience, Some(ANALYST_SYSTEM))
            .await
        {
            Ok(YearsPayload { years: Some(years) }) => return Outcome::Primary(Some(years)),
            Ok(YearsPayload { years: None }) => debug!("LLM found no years requirement"),
            Err(e) => warn!("Experience extraction via LLM failed ({:?}): {e}", e.kind()),
        }
        Outcome::Fallback(rules::experience_years_loose(description))
    }

    pub async fn extract_education(&self, description: &str) -> Outcome<Vec<EducationRequirement>> {
        let prompt = fill_template(EDUCATION_PROMPT_TEMPLATE, &[("description", description)]);

        match self
            .llm
            .generate_structured_as::<EducationPayload>(&prompt, &self.schemas.education, Some(ANALYST_SYSTEM))
            .await
        {
            Ok(payload) => {
                let education: Vec<EducationRequirement> = payload
                    .education
                    .into_iter()
                    .map(|e| EducationRequirement {
                        level: e.level.trim().to_string(),
                        field: e.field.trim().to_string(),
                        required: e.required,
                    })
                    .filter(|e| !e.level.is_empty())
                    .collect();
                if !education.is_empty() {
                    return Outcome::Primary(education);
                }
                debug!("LLM returned no education requirements; using degree ladder rules");
            }
            Err(e) => warn!("Education extraction via LLM failed ({:?}): {e}", e.kind()),
        }
        Outcome::Fallback(self.rules.education(description))
    }

    /// Title keywords first, then LLM classification. `Fallback(None)` means the
    /// caller resolves the level from the extracted years.
    pub async fn classify_job_level(&self, title: &str, description: &str) -> Outcome<Option<JobLevel>> {
        if let Some(level) = self.rules.level_from_title(title) {
            return Outcome::Primary(Some(level));
        }

        let prompt = fill_template(
            JOB_LEVEL_PROMPT_TEMPLATE,
            &[("title", title), ("description", description)],
        );
        match self
            .llm
            .generate_structured_as::<LevelPayload>(&prompt, &self.schemas.job_level, Some(ANALYST_SYSTEM))
            .await
        {
            Ok(payload) => Outcome::Primary(Some(payload.level)),
            Err(e) => {
                warn!("Job level classification via LLM failed ({:?}): {e}", e.kind());
                Outcome::Fallback(None)
            }
        }
    }

    pub async fn extract_keywords(&self, description: &str) -> Outcome<Vec<String>> {
        let prompt = fill_template(KEYWORDS_PROMPT_TEMPLATE, &[("description", description)]);

        match self
            .llm
            .generate_structured_as::<KeywordsPayload>(&prompt, &self.schemas.keywords, Some(ANALYST_SYSTEM))
            .await
        {
            Ok(payload) => {
                let keywords = rules::sanitize_keywords(payload.keywords, self.max_keywords);
                if !keywords.is_empty() {
                    return Outcome::Primary(keywords);
                }
                debug!("LLM returned no keywords; using important-terms list");
            }
            Err(e) => warn!("Keyword extraction via LLM failed ({:?}): {e}", e.kind()),
        }
        Outcome::Fallback(self.rules.keywords(description))
    }

    pub async fn summarize(&self, job: &JobPosting) -> Outcome<String> {
        let location = job
            .location
            .as_ref()
            .map(|l| l.display())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "Not specified".to_string());
        let prompt = fill_template(
            ANALYSIS_SUMMARY_PROMPT_TEMPLATE,
            &[
                ("title", job.title.as_str()),
                ("company", job.company_or_default()),
                ("location", location.as_str()),
                ("description", job.description_text()),
            ],
        );

        match self.llm.generate(&prompt, Some(MARKET_ANALYST_SYSTEM)).await {
            Ok(text) if !text.trim().is_empty() => Outcome::Primary(text.trim().to_string()),
            Ok(_) => {
                debug!("LLM returned an empty analysis summary");
                Outcome::Fallback(rules::summary_template(&job.title, job.company_or_default()))
            }
            Err(e) => {
                warn!("Analysis summary via LLM failed ({:?}): {e}", e.kind());
                Outcome::Fallback(rules::summary_template(&job.title, job.company_or_default()))
            }
        }
    }
}

/// Trims names, drops empties, clamps relevance to 1 – 10 and dedups.
fn sanitize_skills(raw: Vec<SkillPayload>) -> Vec<RequiredSkill> {
    let skills = raw
        .into_iter()
        .filter_map(|s| {
            let name = s.name.trim();
            if name.is_empty() {
                return None;
            }
            Some(RequiredSkill {
                name: name.to_string(),
                category: s.category,
                relevance: s.relevance.clamp(1, 10) as u8,
                years_required: s.years_required,
            })
        })
        .collect();
    rules::dedup_skills(skills)
}
