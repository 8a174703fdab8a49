//! Fit Scoring: pluggable, trait-based scorer that measures a candidate profile
//! against a job's requirement profile.
//!
//! Default: `WeightedFitScorer` (pure Rust, deterministic, fully testable).
//! `ResumePipeline` holds an `Arc<dyn FitScorer>` built from config at startup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::generation::content_selector::{round2, RankingConfig, RelevanceRanker};
use crate::models::candidate::{CandidateProfile, CandidateSkill, EducationEntry, Experience};
use crate::models::match_result::{
    EducationMatch, EducationMatchDetail, ExperienceMatch, FitCategory, FitThresholds,
    MatchResult, MatchedSkill, SkillMatchSummary,
};
use crate::models::requirements::{
    DegreeLevel, EducationRequirement, JobRequirementProfile, RequiredSkill,
};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Implement this to swap backends without touching
/// the pipeline, handlers, or caller code.
///
/// Carried in `ResumePipeline` as `Arc<dyn FitScorer>`.
pub trait FitScorer: Send + Sync {
    /// Backend name, reported for transparency.
    fn backend(&self) -> &'static str;

    /// Scores `candidate` against `requirements`. Open-ended roles end on `as_of`.
    fn score(
        &self,
        candidate: &CandidateProfile,
        requirements: &JobRequirementProfile,
        as_of: NaiveDate,
    ) -> MatchResult;
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Composition of the overall score from the three sub-scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            experience: 0.3,
            education: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    pub fit_thresholds: FitThresholds,
    /// Minimum blended score for a candidate skill to satisfy a requirement.
    pub skill_match_threshold: f64,
    /// Share of the name similarity in the name/years blend.
    pub skill_name_share: f64,
    /// Per-experience relevance when the job lists no skills.
    pub default_experience_relevance: f64,
    /// Relevant years needed for `sufficient` when the job states none.
    pub default_required_years: f64,
    /// (minimum relevant years, score) used when the job states no years, highest first.
    pub experience_buckets: Vec<(f64, f64)>,
    pub experience_floor: f64,
    pub education_level_share: f64,
    pub education_match_threshold: f64,
    /// A required requirement counts as satisfied above this combined score.
    pub education_required_threshold: f64,
    pub missing_required_education_factor: f64,
    /// Education score (0 – 1) when the job lists no education requirements.
    pub no_education_requirements_score: f64,
    pub ranking: RankingConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            fit_thresholds: FitThresholds::default(),
            skill_match_threshold: 0.6,
            skill_name_share: 0.7,
            default_experience_relevance: 0.5,
            default_required_years: 3.0,
            experience_buckets: vec![(7.0, 1.0), (5.0, 0.9), (3.0, 0.8), (1.0, 0.6)],
            experience_floor: 0.3,
            education_level_share: 0.7,
            education_match_threshold: 0.6,
            education_required_threshold: 0.8,
            missing_required_education_factor: 0.5,
            no_education_requirements_score: 0.8,
            ranking: RankingConfig::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedFitScorer
// ────────────────────────────────────────────────────────────────────────────

/// Weighted skill / experience / education scorer.
///
/// overall = skills × 0.5 + experience × 0.3 + education × 0.2, each on 0 – 100.
pub struct WeightedFitScorer {
    config: ScoringConfig,
    ranker: RelevanceRanker,
}

impl WeightedFitScorer {
    pub fn new(config: ScoringConfig) -> Self {
        let ranker = RelevanceRanker::new(config.ranking.clone());
        Self { config, ranker }
    }
}

impl Default for WeightedFitScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl FitScorer for WeightedFitScorer {
    fn backend(&self) -> &'static str {
        "weighted"
    }

    fn score(
        &self,
        candidate: &CandidateProfile,
        requirements: &JobRequirementProfile,
        as_of: NaiveDate,
    ) -> MatchResult {
        let (skill_match, missing_skills) =
            self.match_skills(&candidate.skills, &requirements.skills);
        let experience_match = self.match_experience(
            &candidate.experiences,
            requirements.experience_years,
            &requirements.skills,
            as_of,
        );
        let education_match = self.match_education(&candidate.education, &requirements.education);

        let w = &self.config.weights;
        let overall_score = round2(
            (skill_match.score * w.skills
                + experience_match.score * w.experience
                + education_match.score * w.education)
                .clamp(0.0, 100.0),
        );
        let fit_category = FitCategory::from_score(overall_score, &self.config.fit_thresholds);

        let relevant_experiences = self.ranker.rank(
            &candidate.experiences,
            &requirements.skills,
            requirements.job_level,
            as_of,
        );

        debug!(
            "Scored candidate {}: overall={} skills={} experience={} education={}",
            candidate.id,
            overall_score,
            skill_match.score,
            experience_match.score,
            education_match.score
        );

        MatchResult {
            overall_score,
            fit_category,
            skill_match,
            experience_match,
            education_match,
            relevant_experiences,
            missing_skills,
        }
    }
}

impl WeightedFitScorer {
    // ────────────────────────────────────────────────────────────────────────
    // Skills
    // ────────────────────────────────────────────────────────────────────────

    /// Best candidate skill per requirement. Returns the summary and the
    /// requirements left unmatched.
    pub fn match_skills(
        &self,
        candidate_skills: &[CandidateSkill],
        required: &[RequiredSkill],
    ) -> (SkillMatchSummary, Vec<RequiredSkill>) {
        let mut matched = Vec::new();
        let mut missing = Vec::new();

        for requirement in required {
            let best = candidate_skills
                .iter()
                .filter_map(|cs| self.skill_score(requirement, cs).map(|s| (s, cs)))
                .fold(None, |best: Option<(f64, &CandidateSkill)>, (score, cs)| match best {
                    Some((b, _)) if b >= score => best,
                    _ => Some((score, cs)),
                });

            match best {
                Some((score, cs)) if score >= self.config.skill_match_threshold => {
                    matched.push(MatchedSkill {
                        job_skill: requirement.name.clone(),
                        skill_name: cs.name.clone(),
                        category: requirement.category,
                        match_score: round2(score),
                        years_experience: cs.years,
                        years_required: requirement.years_required,
                        relevance_weighted: round2(score * requirement.weight()),
                    });
                }
                _ => missing.push(requirement.clone()),
            }
        }

        matched.sort_by(|a, b| {
            b.relevance_weighted
                .partial_cmp(&a.relevance_weighted)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total: f64 = matched.iter().map(|m| m.relevance_weighted).sum();
        let score = round2((total / required.len().max(1) as f64 * 100.0).clamp(0.0, 100.0));

        (SkillMatchSummary { score, matched }, missing)
    }

    /// Name similarity, blended with years when both sides record them.
    /// `None` when the names share nothing.
    fn skill_score(&self, requirement: &RequiredSkill, candidate: &CandidateSkill) -> Option<f64> {
        let mut score = name_similarity(&requirement.name, &candidate.name)?;

        if let (Some(required), Some(years)) = (requirement.years_required, candidate.years) {
            if required > 0 {
                let factor = (f64::from(years) / f64::from(required)).min(1.0);
                let share = self.config.skill_name_share;
                score = score * share + factor * (1.0 - share);
            }
        }
        Some(score)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Experience
    // ────────────────────────────────────────────────────────────────────────

    pub fn match_experience(
        &self,
        experiences: &[Experience],
        years_required: Option<u32>,
        skills: &[RequiredSkill],
        as_of: NaiveDate,
    ) -> ExperienceMatch {
        let cfg = &self.config;
        let required = years_required.filter(|y| *y > 0).map(f64::from);
        let threshold = required.unwrap_or(cfg.default_required_years);

        if experiences.is_empty() {
            return ExperienceMatch {
                score: 0.0,
                total_years: 0.0,
                relevant_years: 0.0,
                required_years: years_required,
                sufficient: false,
                skipped_entries: Vec::new(),
            };
        }

        let mut total_years = 0.0;
        let mut relevant_years = 0.0;
        let mut skipped_entries = Vec::new();

        for (index, exp) in experiences.iter().enumerate() {
            let period = match exp.period(as_of) {
                Ok(p) => p,
                Err(e) => {
                    warn!(
                        "Skipping experience {} ({} at {}) in experience totals: {e}",
                        index, exp.title, exp.company
                    );
                    skipped_entries.push(index);
                    continue;
                }
            };
            let duration = period.duration_years();
            total_years += duration;
            relevant_years += duration * self.experience_relevance(exp, skills);
        }

        let ratio = match required {
            Some(years) => (relevant_years / years).min(1.0),
            None => cfg
                .experience_buckets
                .iter()
                .find(|(min_years, _)| relevant_years >= *min_years)
                .map(|(_, score)| *score)
                .unwrap_or(cfg.experience_floor),
        };

        ExperienceMatch {
            score: round2((ratio * 100.0).clamp(0.0, 100.0)),
            total_years: round1(total_years),
            relevant_years: round1(relevant_years),
            required_years: years_required,
            sufficient: relevant_years >= threshold,
            skipped_entries,
        }
    }

    /// Share of required skills (weighted by relevance) an experience demonstrates, 0 – 1.
    fn experience_relevance(&self, exp: &Experience, skills: &[RequiredSkill]) -> f64 {
        if skills.is_empty() {
            return self.config.default_experience_relevance;
        }

        let title = exp.title.to_lowercase();
        let description = exp.description.as_deref().unwrap_or("").to_lowercase();
        let used: Vec<String> = exp.skills_used.iter().map(|s| s.to_lowercase()).collect();

        let hits: f64 = skills
            .iter()
            .filter(|skill| {
                let name = skill.name.trim().to_lowercase();
                !name.is_empty()
                    && (title.contains(&name)
                        || description.contains(&name)
                        || used.iter().any(|u| u.contains(&name)))
            })
            .map(RequiredSkill::weight)
            .sum();

        (hits / skills.len() as f64).min(1.0)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Education
    // ────────────────────────────────────────────────────────────────────────

    pub fn match_education(
        &self,
        education: &[EducationEntry],
        requirements: &[EducationRequirement],
    ) -> EducationMatch {
        let cfg = &self.config;

        if requirements.is_empty() {
            return EducationMatch {
                score: round2(cfg.no_education_requirements_score * 100.0),
                matches: Vec::new(),
                has_required: true,
            };
        }

        let mut matches = Vec::new();
        let mut best = 0.0_f64;
        let mut required_satisfied = false;

        for requirement in requirements {
            let job_level = degree_ordinal(&requirement.level);

            for entry in education {
                let candidate_level = degree_ordinal(&entry.degree);
                let level_match = if candidate_level >= job_level {
                    1.0
                } else {
                    f64::from(candidate_level) / f64::from(job_level.max(1))
                };
                let field_match = field_similarity(&requirement.field, &entry.field);
                let combined = level_match * cfg.education_level_share
                    + field_match * (1.0 - cfg.education_level_share);

                if combined > cfg.education_match_threshold {
                    matches.push(EducationMatchDetail {
                        job_requirement: describe(&requirement.level, &requirement.field),
                        candidate_education: describe(&entry.degree, &entry.field),
                        level_match: round2(level_match),
                        field_match: round2(field_match),
                        match_score: round2(combined),
                        required: requirement.required,
                    });
                    best = best.max(combined);
                    if requirement.required && combined > cfg.education_required_threshold {
                        required_satisfied = true;
                    }
                }
            }
        }

        let has_required = !requirements.iter().any(|r| r.required) || required_satisfied;
        let ratio = if has_required {
            best
        } else {
            best * cfg.missing_required_education_factor
        };

        EducationMatch {
            score: round2((ratio * 100.0).clamp(0.0, 100.0)),
            matches,
            has_required,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Similarity helpers
// ────────────────────────────────────────────────────────────────────────────

/// Exact → 1.0; containment → shorter/longer length; shared words → |common|/|required words|.
fn name_similarity(required: &str, candidate: &str) -> Option<f64> {
    let required = required.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();
    if required.is_empty() || candidate.is_empty() {
        return None;
    }
    if required == candidate {
        return Some(1.0);
    }
    if required.contains(&candidate) || candidate.contains(&required) {
        let (a, b) = (required.chars().count(), candidate.chars().count());
        return Some(a.min(b) as f64 / a.max(b) as f64);
    }
    let overlap = word_overlap(&required, &candidate);
    (overlap > 0.0).then_some(overlap)
}

/// An empty required field accepts any field; an empty candidate field matches nothing else.
fn field_similarity(required: &str, candidate: &str) -> f64 {
    let required = required.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();
    if required.is_empty() {
        return 1.0;
    }
    if candidate.is_empty() {
        return 0.0;
    }
    if required.contains(&candidate) || candidate.contains(&required) {
        return 1.0;
    }
    word_overlap(&required, &candidate)
}

/// |common words| / |words in `required`|.
fn word_overlap(required: &str, candidate: &str) -> f64 {
    let required_words: Vec<&str> = dedup_words(required);
    let candidate_words: Vec<&str> = dedup_words(candidate);
    if required_words.is_empty() {
        return 0.0;
    }
    let common = required_words
        .iter()
        .filter(|w| candidate_words.contains(w))
        .count();
    common as f64 / required_words.len() as f64
}

fn dedup_words(text: &str) -> Vec<&str> {
    let mut words: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        if !words.contains(&word) {
            words.push(word);
        }
    }
    words
}

/// Position of a degree string on the 1 – 5 ladder, 0 when unrecognized.
fn degree_ordinal(degree: &str) -> u8 {
    DegreeLevel::from_text(degree).map_or(0, |level| level.ordinal())
}

fn describe(level: &str, field: &str) -> String {
    if field.trim().is_empty() {
        level.to_string()
    } else {
        format!("{level} in {field}")
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requirements::{JobLevel, SkillCategory};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn required(name: &str, relevance: u8, years: Option<u32>) -> RequiredSkill {
        RequiredSkill {
            name: name.to_string(),
            category: SkillCategory::Technical,
            relevance,
            years_required: years,
        }
    }

    fn has(name: &str, years: Option<u32>) -> CandidateSkill {
        CandidateSkill {
            name: name.to_string(),
            years,
            level: None,
        }
    }

    fn exp(title: &str, start: &str, end: Option<&str>, used: &[&str]) -> Experience {
        Experience {
            company: "Acme".to_string(),
            title: title.to_string(),
            start_date: start.to_string(),
            end_date: end.map(str::to_string),
            description: None,
            achievements: vec![],
            skills_used: used.iter().map(|s| s.to_string()).collect(),
            location: None,
        }
    }

    fn degree(degree: &str, field: &str) -> EducationEntry {
        EducationEntry {
            degree: degree.to_string(),
            field: field.to_string(),
            institution: "State University".to_string(),
            location: None,
            graduation_date: None,
            achievements: vec![],
        }
    }

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            id: uuid::Uuid::nil(),
            name: Default::default(),
            title: "Data Engineer".to_string(),
            contact: Default::default(),
            summary: None,
            skills: vec![has("Python", Some(6)), has("PostgreSQL", Some(4)), has("Docker", None)],
            experiences: vec![
                exp("Data Engineer", "2019-01", None, &["Python", "PostgreSQL"]),
                exp("Analyst", "2016-01", Some("2019-01"), &["Excel"]),
            ],
            education: vec![degree("Bachelor's", "Computer Science")],
            certifications: vec![],
        }
    }

    fn requirements() -> JobRequirementProfile {
        JobRequirementProfile {
            skills: vec![
                required("Python", 9, Some(3)),
                required("SQL", 8, None),
                required("Kubernetes", 6, None),
            ],
            experience_years: Some(4),
            education: vec![EducationRequirement {
                level: "Bachelor's".to_string(),
                field: "Computer Science".to_string(),
                required: true,
            }],
            job_level: JobLevel::Mid,
            keywords: vec![],
            summary: String::new(),
        }
    }

    #[test]
    fn test_exact_skill_with_sufficient_years() {
        let scorer = WeightedFitScorer::default();
        let (summary, missing) = scorer.match_skills(
            &[has("Python", Some(5))],
            &[required("Python", 8, Some(3))],
        );
        assert!(missing.is_empty());
        let m = &summary.matched[0];
        assert!((m.match_score - 1.0).abs() < 1e-9);
        assert!((m.relevance_weighted - 0.8).abs() < 1e-9);
        assert!((summary.score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_candidate_skills_all_missing() {
        let scorer = WeightedFitScorer::default();
        let (summary, missing) = scorer.match_skills(&[], &[required("SQL", 8, None)]);
        assert!(summary.matched.is_empty());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "SQL");
        assert_eq!(summary.score, 0.0);
    }

    #[test]
    fn test_containment_ratio_below_threshold_is_rejected() {
        let scorer = WeightedFitScorer::default();
        // "sql" in "postgresql": 3/10 = 0.3
        let (summary, missing) =
            scorer.match_skills(&[has("PostgreSQL", None)], &[required("SQL", 8, None)]);
        assert!(summary.matched.is_empty());
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn test_word_overlap_and_years_blend() {
        let scorer = WeightedFitScorer::default();
        let (summary, _) = scorer.match_skills(
            &[has("AWS Lambda", Some(1))],
            &[required("AWS cloud", 10, Some(2))],
        );
        // "aws cloud" vs "aws lambda": 1 of 2 words → 0.5 × 0.7 + 0.5 × 0.3 = 0.5 → rejected
        assert!(summary.matched.is_empty());

        let (summary, _) = scorer.match_skills(
            &[has("Cloud AWS", Some(1))],
            &[required("AWS", 10, Some(2))],
        );
        // containment 3/9 → 0.333 × 0.7 + 0.5 × 0.3 = 0.383 → rejected
        assert!(summary.matched.is_empty());

        let (summary, _) = scorer.match_skills(
            &[has("Machine Learning Ops", Some(1))],
            &[required("Learning Machine", 10, Some(2))],
        );
        // both words shared → 1.0 × 0.7 + 0.5 × 0.3
        let m = &summary.matched[0];
        assert!((m.match_score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_accepted_matches_never_below_threshold() {
        let scorer = WeightedFitScorer::default();
        let skills = [
            has("Java", Some(1)),
            has("JavaScript", Some(10)),
            has("Project Management", None),
            has("Go", Some(2)),
        ];
        let reqs = [
            required("Java", 7, Some(8)),
            required("Management", 5, None),
            required("Golang", 6, Some(1)),
            required("Rust", 9, None),
        ];
        let (summary, missing) = scorer.match_skills(&skills, &reqs);
        assert!(summary.matched.iter().all(|m| m.match_score >= 0.6));
        assert_eq!(summary.matched.len() + missing.len(), reqs.len());
        let weights: Vec<f64> = summary.matched.iter().map(|m| m.relevance_weighted).collect();
        assert!(weights.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_experience_ratio_caps_at_one() {
        let scorer = WeightedFitScorer::default();
        let exps = [exp("Rust Engineer", "2018-06", Some("2024-06"), &[])];
        let m = scorer.match_experience(&exps, Some(5), &[required("Rust", 10, None)], today());
        assert!((m.relevant_years - 6.0).abs() < 1e-9);
        assert_eq!(m.score, 100.0);
        assert!(m.sufficient);
    }

    #[test]
    fn test_partial_skill_coverage_averages_weights() {
        let scorer = WeightedFitScorer::default();
        let skills = [
            required("Rust", 8, None),
            required("Kafka", 4, None),
            required("Terraform", 6, None),
        ];

        // (0.8 + 0.4) / 3 = 0.4 of 5 years
        let exps = [exp("Backend Engineer", "2018-01", Some("2023-01"), &["Rust", "Kafka"])];
        let m = scorer.match_experience(&exps, Some(4), &skills, today());
        assert!((m.total_years - 5.0).abs() < 1e-9);
        assert!((m.relevant_years - 2.0).abs() < 1e-9);
        assert_eq!(m.score, 50.0);
        assert!(!m.sufficient);

        // Terraform found in the description; every skill at full relevance caps at 1.0
        let mut full = exp("Rust Engineer", "2018-01", Some("2023-01"), &["Kafka"]);
        full.description = Some("Owned Terraform modules".to_string());
        let top = [
            required("Rust", 10, None),
            required("Kafka", 10, None),
            required("Terraform", 10, None),
        ];
        let m = scorer.match_experience(&[full.clone()], Some(4), &top, today());
        assert!((m.relevant_years - 5.0).abs() < 1e-9);

        let m = scorer.match_experience(&[full], Some(4), &skills, today());
        assert!((m.relevant_years - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_experience_buckets_without_requirement() {
        let scorer = WeightedFitScorer::default();
        // no job skills → relevance 0.5; 8 years × 0.5 = 4 relevant years → 0.8
        let exps = [exp("Engineer", "2016-06", Some("2024-06"), &[])];
        let m = scorer.match_experience(&exps, None, &[], today());
        assert!((m.relevant_years - 4.0).abs() < 1e-9);
        assert_eq!(m.score, 80.0);
        assert!(m.sufficient);

        let m = scorer.match_experience(&[], None, &[], today());
        assert_eq!(m.score, 0.0);
        assert!(!m.sufficient);
    }

    #[test]
    fn test_invalid_experience_is_skipped_not_fatal() {
        let scorer = WeightedFitScorer::default();
        let exps = [
            exp("Engineer", "2020-06", Some("2024-06"), &[]),
            exp("Engineer", "June 2010", Some("2012-01"), &[]),
            exp("Engineer", "2015-01", Some("2013-01"), &[]),
        ];
        let m = scorer.match_experience(&exps, None, &[], today());
        assert_eq!(m.skipped_entries, vec![1, 2]);
        assert!((m.total_years - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_bachelor_computer_science_exact() {
        let scorer = WeightedFitScorer::default();
        let m = scorer.match_education(
            &[degree("Bachelor's", "Computer Science")],
            &[EducationRequirement {
                level: "Bachelor's".to_string(),
                field: "Computer Science".to_string(),
                required: true,
            }],
        );
        assert_eq!(m.matches.len(), 1);
        assert_eq!(m.matches[0].level_match, 1.0);
        assert_eq!(m.matches[0].field_match, 1.0);
        assert_eq!(m.matches[0].match_score, 1.0);
        assert!(m.has_required);
        assert_eq!(m.score, 100.0);
    }

    #[test]
    fn test_missing_required_education_halves_best() {
        let scorer = WeightedFitScorer::default();
        // associate (2) vs bachelor (3): 2/3 × 0.7 + 1.0 × 0.3 ≈ 0.767 → match but not > 0.8
        let m = scorer.match_education(
            &[degree("Associate's", "Computer Science")],
            &[EducationRequirement {
                level: "Bachelor's".to_string(),
                field: "Computer Science".to_string(),
                required: true,
            }],
        );
        assert_eq!(m.matches.len(), 1);
        assert!(!m.has_required);
        assert!((m.score - 38.33).abs() < 0.01);
    }

    #[test]
    fn test_no_education_requirements_defaults() {
        let scorer = WeightedFitScorer::default();
        let m = scorer.match_education(&[], &[]);
        assert_eq!(m.score, 80.0);
        assert!(m.has_required);
    }

    #[test]
    fn test_any_field_requirement() {
        let scorer = WeightedFitScorer::default();
        let m = scorer.match_education(
            &[degree("Master of Science", "Physics")],
            &[EducationRequirement {
                level: "Bachelor's".to_string(),
                field: String::new(),
                required: true,
            }],
        );
        assert!(m.has_required);
        assert_eq!(m.score, 100.0);
    }

    #[test]
    fn test_overall_is_weighted_composition() {
        let scorer = WeightedFitScorer::default();
        let result = scorer.score(&candidate(), &requirements(), today());
        let expected = result.skill_match.score * 0.5
            + result.experience_match.score * 0.3
            + result.education_match.score * 0.2;
        assert!((result.overall_score - round2(expected)).abs() < 1e-9);
        assert_eq!(
            result.fit_category,
            FitCategory::from_score(result.overall_score, &FitThresholds::default())
        );
        let missing: Vec<&str> = result.missing_skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(missing, vec!["SQL", "Kubernetes"]);
        assert_eq!(result.relevant_experiences[0].index, 0);
    }

    #[test]
    fn test_scores_stay_in_bounds() {
        let mut config = ScoringConfig::default();
        config.weights = ScoreWeights {
            skills: 1.0,
            experience: 1.0,
            education: 1.0,
        };
        let scorer = WeightedFitScorer::new(config);
        let mut profile = candidate();
        profile.skills.push(has("SQL", Some(20)));
        profile.skills.push(has("Kubernetes", Some(20)));
        let result = scorer.score(&profile, &requirements(), today());

        for score in [
            result.overall_score,
            result.skill_match.score,
            result.experience_match.score,
            result.education_match.score,
        ] {
            assert!((0.0..=100.0).contains(&score), "{score}");
        }
        assert_eq!(result.overall_score, 100.0);
    }
}
