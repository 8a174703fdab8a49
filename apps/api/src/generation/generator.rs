//! Resume Generation: the content synthesizer.
//!
//! Flow: header (title alignment) → LLM summary → skills partition →
//!       ranked experience section (LLM rewrite of the top entries) → education
//!       and certifications verbatim.
//!
//! Every LLM call has a verbatim fallback: a failed or unusable response keeps
//! the candidate's own words. `synthesize` never fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::generation::jd_parser::Outcome;
use crate::generation::prompts::{
    ACHIEVEMENTS_PROMPT_TEMPLATE, ACHIEVEMENT_WRITER_SYSTEM, RESUME_SUMMARY_PROMPT_TEMPLATE,
    SUMMARY_WRITER_SYSTEM,
};
use crate::llm_client::prompts::{fill_template, GROUNDING_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::candidate::{CandidateProfile, Experience};
use crate::models::job::JobPosting;
use crate::models::match_result::MatchResult;
use crate::models::requirements::{JobRequirementProfile, SkillCategory};
use crate::models::resume::{ResumeContent, ResumeExperience, ResumeHeader, SkillsSection};

lazy_static! {
    static ref LEVEL_PREFIX: Regex =
        Regex::new(r"^(senior|lead|principal|staff|junior|associate)\s+").unwrap();
    static ref GRADE_SUFFIX: Regex = Regex::new(r"\s+(i|ii|iii|iv|v)$").unwrap();
    static ref BULLET_MARKER: Regex = Regex::new(r"^(?:[-*•]|\d+[.)])\s*").unwrap();
    static ref METRIC: Regex = Regex::new(r"\d+(?:[.,]\d+)*%?").unwrap();
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Top-ranked experiences whose achievements are rewritten.
    pub tailored_experiences: usize,
    /// Required skills named in the summary and rewrite prompts.
    pub prompt_skills: usize,
    /// Ranked experiences named in the summary prompt.
    pub summary_experiences: usize,
    pub max_technical_skills: usize,
    pub max_soft_skills: usize,
    pub max_domain_skills: usize,
    /// Substrings that file an unmatched candidate skill under technical.
    pub technical_terms: Vec<String>,
    /// Substrings that file an unmatched candidate skill under soft.
    pub soft_terms: Vec<String>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            tailored_experiences: 3,
            prompt_skills: 5,
            summary_experiences: 2,
            max_technical_skills: 10,
            max_soft_skills: 5,
            max_domain_skills: 5,
            technical_terms: owned(&[
                "programming",
                "software",
                "database",
                "framework",
                "language",
                "platform",
                "tool",
                "system",
                "development",
                "engineering",
            ]),
            soft_terms: owned(&[
                "communication",
                "leadership",
                "teamwork",
                "problem solving",
                "management",
                "collaboration",
                "organization",
                "creative",
            ]),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Synthesizer
// ────────────────────────────────────────────────────────────────────────────

pub struct ContentSynthesizer {
    llm: LlmClient,
    config: SynthesisConfig,
}

impl ContentSynthesizer {
    pub fn new(llm: LlmClient, config: SynthesisConfig) -> Self {
        Self { llm, config }
    }

    /// Assembles the tailored resume content for one (candidate, job) pair.
    ///
    /// The summary and the achievement rewrites only read the finished match
    /// result, so they run concurrently.
    pub async fn synthesize(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
        requirements: &JobRequirementProfile,
        match_result: &MatchResult,
    ) -> ResumeContent {
        let header = ResumeHeader {
            name: candidate.name.full(),
            title: customize_title(&candidate.title, &job.title),
            contact: candidate.contact.clone(),
        };
        let skills = self.skills_section(candidate, match_result);

        let (summary, experience) = tokio::join!(
            self.summary(candidate, job, requirements, match_result),
            self.experience_section(candidate, job, requirements, match_result),
        );

        info!(
            "Synthesized resume for candidate {} / job {}: summary ({}), {} experiences ({} tailored)",
            candidate.id,
            job.id,
            summary.path(),
            experience.len(),
            experience.iter().filter(|e| e.tailored).count()
        );

        ResumeContent {
            candidate_id: candidate.id,
            job_id: job.id,
            header,
            summary: summary.into_inner(),
            skills,
            experience,
            education: candidate.education.clone(),
            certifications: candidate.certifications.clone(),
        }
    }

    /// LLM-written summary; the candidate's own summary (or "") on failure.
    pub async fn summary(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
        requirements: &JobRequirementProfile,
        match_result: &MatchResult,
    ) -> Outcome<String> {
        let existing = candidate.summary.clone().unwrap_or_default();
        let highlights = match_result
            .relevant_experiences
            .iter()
            .take(self.config.summary_experiences)
            .map(|r| format!("{} at {}", r.title, r.company))
            .collect::<Vec<_>>()
            .join(", ");

        let skills = self.top_skills(requirements);
        let prompt = fill_template(
            RESUME_SUMMARY_PROMPT_TEMPLATE,
            &[
                ("title", job.title.as_str()),
                ("company", job.company_or_default()),
                ("skills", skills.as_str()),
                ("level", requirements.job_level.as_str()),
                ("experience", highlights.as_str()),
                ("summary", existing.as_str()),
                ("grounding", GROUNDING_INSTRUCTION),
            ],
        );

        match self.llm.generate(&prompt, Some(SUMMARY_WRITER_SYSTEM)).await {
            Ok(text) if !text.trim().is_empty() => Outcome::Primary(text.trim().to_string()),
            Ok(_) => {
                debug!("LLM returned an empty summary; keeping the candidate's own");
                Outcome::Fallback(existing)
            }
            Err(e) => {
                warn!("Summary via LLM failed ({:?}): {e}", e.kind());
                Outcome::Fallback(existing)
            }
        }
    }

    /// Matched skills by category, then unmatched candidate skills by keyword heuristics.
    pub fn skills_section(
        &self,
        candidate: &CandidateProfile,
        match_result: &MatchResult,
    ) -> SkillsSection {
        let cfg = &self.config;
        let mut section = SkillsSection::default();

        for matched in &match_result.skill_match.matched {
            let bucket = match matched.category {
                SkillCategory::Technical => &mut section.technical,
                SkillCategory::Soft => &mut section.soft,
                SkillCategory::Domain => &mut section.domain,
            };
            push_unique(bucket, &matched.skill_name);
        }

        for skill in &candidate.skills {
            let name = skill.name.trim();
            if name.is_empty() || listed(&section, name) {
                continue;
            }
            let lower = name.to_lowercase();
            let bucket = if cfg.technical_terms.iter().any(|t| lower.contains(t.as_str())) {
                &mut section.technical
            } else if cfg.soft_terms.iter().any(|t| lower.contains(t.as_str())) {
                &mut section.soft
            } else {
                &mut section.domain
            };
            push_unique(bucket, name);
        }

        section.technical.truncate(cfg.max_technical_skills);
        section.soft.truncate(cfg.max_soft_skills);
        section.domain.truncate(cfg.max_domain_skills);
        section
    }

    /// Experiences in ranking order; the top entries get rewritten achievements.
    pub async fn experience_section(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
        requirements: &JobRequirementProfile,
        match_result: &MatchResult,
    ) -> Vec<ResumeExperience> {
        let mut order: Vec<usize> = match_result
            .relevant_experiences
            .iter()
            .map(|r| r.index)
            .filter(|i| *i < candidate.experiences.len())
            .collect();
        for index in 0..candidate.experiences.len() {
            if !order.contains(&index) {
                order.push(index);
            }
        }

        let mut section = Vec::with_capacity(order.len());
        for (rank, index) in order.into_iter().enumerate() {
            let exp = &candidate.experiences[index];
            let achievements = if rank < self.config.tailored_experiences {
                self.rewrite_achievements(exp, job, requirements).await
            } else {
                Outcome::Fallback(exp.achievements.clone())
            };

            section.push(ResumeExperience {
                company: exp.company.clone(),
                title: exp.title.clone(),
                start_date: exp.start_date.clone(),
                end_date: exp.end_date.clone(),
                location: exp.location.clone(),
                description: exp.description.clone(),
                tailored: !achievements.is_fallback(),
                achievements: achievements.into_inner(),
                skills_used: exp.skills_used.clone(),
                relevance_rank: rank,
            });
        }
        section
    }

    /// Rewritten bullets, or the originals when the LLM fails, returns nothing
    /// usable, or drops a metric.
    pub async fn rewrite_achievements(
        &self,
        exp: &Experience,
        job: &JobPosting,
        requirements: &JobRequirementProfile,
    ) -> Outcome<Vec<String>> {
        let originals = &exp.achievements;
        if originals.iter().all(|a| a.trim().is_empty()) {
            return Outcome::Fallback(originals.clone());
        }

        let listing = originals
            .iter()
            .map(|a| format!("- {}", a.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        let skills = self.top_skills(requirements);
        let prompt = fill_template(
            ACHIEVEMENTS_PROMPT_TEMPLATE,
            &[
                ("title", job.title.as_str()),
                ("skills", skills.as_str()),
                ("achievements", listing.as_str()),
                ("grounding", GROUNDING_INSTRUCTION),
            ],
        );

        let text = match self.llm.generate(&prompt, Some(ACHIEVEMENT_WRITER_SYSTEM)).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Achievement rewrite for {} at {} failed ({:?}): {e}",
                    exp.title,
                    exp.company,
                    e.kind()
                );
                return Outcome::Fallback(originals.clone());
            }
        };

        let rewritten = parse_bullets(&text);
        if rewritten.is_empty() {
            debug!("No bullets in rewrite for {} at {}", exp.title, exp.company);
            return Outcome::Fallback(originals.clone());
        }
        if let Some(metric) = dropped_metric(originals, &rewritten) {
            warn!(
                "Rewrite for {} at {} dropped metric {metric:?}; keeping originals",
                exp.title, exp.company
            );
            return Outcome::Fallback(originals.clone());
        }
        Outcome::Primary(rewritten)
    }

    fn top_skills(&self, requirements: &JobRequirementProfile) -> String {
        requirements
            .skills
            .iter()
            .take(self.config.prompt_skills)
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Aligns the candidate's title with the job title without misrepresenting it.
///
/// Same core role (seniority prefix and grade suffix stripped): take the job's
/// seniority prefix, if it has one. Different core but ≥2 shared words: the job
/// title. Otherwise the candidate's title.
pub fn customize_title(candidate_title: &str, job_title: &str) -> String {
    let candidate_lower = candidate_title.trim().to_lowercase();
    let job_lower = job_title.trim().to_lowercase();

    if candidate_lower.is_empty() || job_lower.is_empty() || candidate_lower == job_lower {
        return candidate_title.to_string();
    }

    let candidate_core = core_title(&candidate_lower);
    let job_core = core_title(&job_lower);

    if candidate_core == job_core {
        return match LEVEL_PREFIX.captures(&job_lower) {
            Some(caps) => format!("{} {}", title_case(&caps[1]), title_case(&candidate_core)),
            None => candidate_title.to_string(),
        };
    }

    let job_words = title_words(&job_lower);
    let shared = title_words(&candidate_lower)
        .into_iter()
        .filter(|w| job_words.contains(w))
        .count();

    if shared >= 2 {
        job_title.trim().to_string()
    } else {
        candidate_title.to_string()
    }
}

fn core_title(title: &str) -> String {
    let stripped = LEVEL_PREFIX.replace(title, "");
    GRADE_SUFFIX.replace(&stripped, "").trim().to_string()
}

/// Distinct alphanumeric words.
fn title_words(title: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for word in title.split(|c: char| !c.is_alphanumeric()) {
        if !word.is_empty() && !words.contains(&word) {
            words.push(word);
        }
    }
    words
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Bullet-marked lines if there are any, else every non-empty non-heading line.
pub fn parse_bullets(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let marked: Vec<String> = lines
        .iter()
        .filter(|l| BULLET_MARKER.is_match(l))
        .map(|l| BULLET_MARKER.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if !marked.is_empty() {
        return marked;
    }

    lines
        .into_iter()
        .filter(|l| !l.starts_with('#') && !l.ends_with(':'))
        .map(str::to_string)
        .collect()
}

/// First number in `originals` that no rewritten bullet carries.
fn dropped_metric(originals: &[String], rewritten: &[String]) -> Option<String> {
    let joined = rewritten.join("\n");
    originals
        .iter()
        .flat_map(|a| METRIC.find_iter(a))
        .map(|m| m.as_str())
        .find(|metric| !joined.contains(metric))
        .map(str::to_string)
}

fn listed(section: &SkillsSection, name: &str) -> bool {
    [&section.technical, &section.soft, &section.domain]
        .into_iter()
        .flatten()
        .any(|s| s.eq_ignore_ascii_case(name))
}

fn push_unique(bucket: &mut Vec<String>, name: &str) {
    if !bucket.iter().any(|s| s.eq_ignore_ascii_case(name)) {
        bucket.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::generation::fit_scoring::{FitScorer, WeightedFitScorer};
    use crate::llm_client::testing::{FailingPort, ScriptedPort};
    use crate::llm_client::{LlmSettings, TextGenerationPort};
    use crate::models::candidate::{CandidateSkill, PersonName};
    use crate::models::requirements::{JobLevel, RequiredSkill};

    fn synthesizer(port: Arc<dyn TextGenerationPort>) -> ContentSynthesizer {
        let llm = LlmClient::new(port, &LlmSettings::default());
        ContentSynthesizer::new(llm, SynthesisConfig::default())
    }

    fn exp(company: &str, title: &str, start: &str, achievements: &[&str]) -> Experience {
        Experience {
            company: company.to_string(),
            title: title.to_string(),
            start_date: start.to_string(),
            end_date: Some("2024-01".to_string()),
            description: None,
            achievements: achievements.iter().map(|s| s.to_string()).collect(),
            skills_used: vec![],
            location: None,
        }
    }

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: uuid::Uuid::nil(),
            name: PersonName {
                first: "Ada".to_string(),
                last: "Lovelace".to_string(),
            },
            title: "Software Engineer".to_string(),
            contact: Default::default(),
            summary: Some("Engineer who ships.".to_string()),
            skills: vec![
                CandidateSkill {
                    name: "Python".to_string(),
                    years: Some(5),
                    level: None,
                },
                CandidateSkill {
                    name: "Database tuning".to_string(),
                    years: None,
                    level: None,
                },
                CandidateSkill {
                    name: "Team leadership".to_string(),
                    years: None,
                    level: None,
                },
                CandidateSkill {
                    name: "Payments".to_string(),
                    years: None,
                    level: None,
                },
            ],
            experiences: vec![
                exp("Old Co", "Support Analyst", "2010-01", &["Closed 300 tickets a month"]),
                exp("Py Co", "Python Developer", "2020-01", &["Cut latency by 40%", "Built APIs"]),
                exp("Mid Co", "Developer", "2015-01", &[]),
                exp("Tiny Co", "Intern", "2009-01", &["Filed reports"]),
            ],
            education: vec![],
            certifications: vec![],
        }
    }

    fn job() -> JobPosting {
        JobPosting {
            id: uuid::Uuid::nil(),
            title: "Senior Software Engineer".to_string(),
            company_name: "Acme".to_string(),
            location: None,
            description: Some("Python services".to_string()),
            job_url: None,
            analysis: None,
        }
    }

    fn requirements() -> JobRequirementProfile {
        JobRequirementProfile {
            skills: vec![RequiredSkill {
                name: "Python".to_string(),
                category: SkillCategory::Technical,
                relevance: 9,
                years_required: Some(3),
            }],
            experience_years: Some(3),
            education: vec![],
            job_level: JobLevel::Senior,
            keywords: vec![],
            summary: String::new(),
        }
    }

    fn scored(profile: &CandidateProfile) -> MatchResult {
        WeightedFitScorer::default().score(
            profile,
            &requirements(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_customize_title() {
        assert_eq!(
            customize_title("Software Engineer", "Senior Software Engineer"),
            "Senior Software Engineer"
        );
        assert_eq!(customize_title("Data Engineer II", "Lead Data Engineer"), "Lead Data Engineer");
        assert_eq!(
            customize_title("Senior Data Engineer", "Data Engineer"),
            "Senior Data Engineer"
        );
        assert_eq!(
            customize_title("Backend Software Engineer", "Software Engineer, Payments"),
            "Software Engineer, Payments"
        );
        assert_eq!(customize_title("Chef", "Software Engineer"), "Chef");
        assert_eq!(customize_title("", "Software Engineer"), "");
    }

    #[test]
    fn test_parse_bullets_prefers_marked_lines() {
        let text = "Here are the bullets:\n- Led migration\n* Cut costs 20%\n• Mentored 3 engineers\n2) Shipped v2";
        assert_eq!(
            parse_bullets(text),
            vec!["Led migration", "Cut costs 20%", "Mentored 3 engineers", "Shipped v2"]
        );

        let text = "# Achievements\nRewrote the billing service\n\nReduced churn";
        assert_eq!(
            parse_bullets(text),
            vec!["Rewrote the billing service", "Reduced churn"]
        );
    }

    #[test]
    fn test_dropped_metric_detection() {
        let originals = vec!["Cut latency by 40% across 1,200 hosts".to_string()];
        let kept = vec!["Reduced latency 40% on 1,200 hosts".to_string()];
        let lost = vec!["Reduced latency substantially on 1,200 hosts".to_string()];
        assert_eq!(dropped_metric(&originals, &kept), None);
        assert_eq!(dropped_metric(&originals, &lost), Some("40%".to_string()));
    }

    #[test]
    fn test_skills_section_partitions_and_caps() {
        let synth = synthesizer(Arc::new(FailingPort::new()));
        let mut profile = candidate();
        for i in 0..8 {
            profile.skills.push(CandidateSkill {
                name: format!("Domain area {i}"),
                years: None,
                level: None,
            });
        }
        let section = synth.skills_section(&profile, &scored(&profile));

        assert_eq!(section.technical, vec!["Python", "Database tuning"]);
        assert_eq!(section.soft, vec!["Team leadership"]);
        assert_eq!(section.domain.len(), 5);
        assert_eq!(section.domain[0], "Payments");
    }

    #[test]
    fn test_technical_skills_keep_top_ten_by_relevance() {
        let synth = synthesizer(Arc::new(FailingPort::new()));
        let languages = [
            ("Kotlin", 6),
            ("Rust", 10),
            ("Scala", 7),
            ("Go", 9),
            ("Ruby", 5),
            ("Java", 8),
            ("Python", 10),
            ("Haskell", 9),
            ("Elixir", 8),
            ("OCaml", 7),
            ("Erlang", 6),
            ("Clojure", 5),
        ];
        let mut reqs = requirements();
        reqs.skills = languages
            .iter()
            .map(|(name, relevance)| RequiredSkill {
                name: name.to_string(),
                category: SkillCategory::Technical,
                relevance: *relevance,
                years_required: None,
            })
            .collect();

        let mut profile = candidate();
        let mut names: Vec<&str> = languages.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        profile.skills = names
            .into_iter()
            .map(|name| CandidateSkill {
                name: name.to_string(),
                years: None,
                level: None,
            })
            .collect();

        let result = WeightedFitScorer::default().score(
            &profile,
            &reqs,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        assert_eq!(result.skill_match.matched.len(), 12);

        let section = synth.skills_section(&profile, &result);
        // ties keep requirement order; the two relevance-5 skills fall off
        assert_eq!(
            section.technical,
            vec![
                "Rust", "Python", "Go", "Haskell", "Java", "Elixir", "Scala", "OCaml", "Kotlin",
                "Erlang"
            ]
        );
        assert!(section.domain.is_empty());
    }

    #[tokio::test]
    async fn test_failing_backend_keeps_everything_verbatim() {
        let port = Arc::new(FailingPort::new());
        let synth = synthesizer(port.clone());
        let profile = candidate();
        let result = scored(&profile);
        let content = synth.synthesize(&profile, &job(), &requirements(), &result).await;

        assert_eq!(content.summary, "Engineer who ships.");
        assert_eq!(content.header.name, "Ada Lovelace");
        assert_eq!(content.header.title, "Senior Software Engineer");
        assert_eq!(content.experience.len(), profile.experiences.len());
        for entry in &content.experience {
            let source = profile
                .experiences
                .iter()
                .find(|e| e.company == entry.company)
                .unwrap();
            assert_eq!(entry.achievements, source.achievements);
            assert!(!entry.tailored);
        }
        // summary + two of the top three (one has no achievements)
        assert_eq!(port.calls(), 3);
    }

    #[tokio::test]
    async fn test_experiences_follow_ranking_and_top_three_are_rewritten() {
        let synth = synthesizer(Arc::new(ScriptedPort::new(|request| {
            let prompt = request.prompt;
            let body = if prompt.contains("Cut latency by 40%") {
                "- Slashed Python API latency by 40%\n- Built Python APIs"
            } else if prompt.contains("Closed 300 tickets") {
                "- Resolved many tickets"
            } else {
                "Seasoned engineer."
            };
            Ok(body.to_string())
        })));
        let profile = candidate();
        let result = scored(&profile);
        let content = synth.synthesize(&profile, &job(), &requirements(), &result).await;

        let companies: Vec<&str> = content.experience.iter().map(|e| e.company.as_str()).collect();
        let expected: Vec<&str> = result
            .relevant_experiences
            .iter()
            .map(|r| r.company.as_str())
            .collect();
        assert_eq!(companies, expected);
        assert_eq!(companies[0], "Py Co");

        let top = &content.experience[0];
        assert!(top.tailored);
        assert_eq!(top.relevance_rank, 0);
        assert_eq!(
            top.achievements,
            vec!["Slashed Python API latency by 40%", "Built Python APIs"]
        );

        // dropped "300" → originals kept
        let support = content
            .experience
            .iter()
            .find(|e| e.company == "Old Co")
            .unwrap();
        assert!(!support.tailored);
        assert_eq!(support.achievements, vec!["Closed 300 tickets a month"]);

        let last = content.experience.last().unwrap();
        assert_eq!(last.relevance_rank, 3);
        assert!(!last.tailored);
        assert_eq!(content.summary, "Seasoned engineer.");
    }

    #[tokio::test]
    async fn test_blank_summary_response_falls_back() {
        let synth = synthesizer(Arc::new(ScriptedPort::new(|_| Ok("   ".to_string()))));
        let mut profile = candidate();
        profile.summary = None;
        let outcome = synth
            .summary(&profile, &job(), &requirements(), &scored(&profile))
            .await;
        assert_eq!(outcome, Outcome::Fallback(String::new()));
    }
}
