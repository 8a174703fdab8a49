//! Content Selector: ranks a candidate's experiences by relevance to a job.
//!
//! No LLM calls. The ranking feeds both the match result and the order of the
//! experience section in the generated resume.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::candidate::Experience;
use crate::models::match_result::RankedExperience;
use crate::models::requirements::{JobLevel, RequiredSkill};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Multipliers applied when an experience title lines up with the job level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAlignment {
    pub executive: f64,
    pub senior: f64,
    pub mid: f64,
    pub entry: f64,
    pub executive_keywords: Vec<String>,
    pub senior_keywords: Vec<String>,
    pub junior_keywords: Vec<String>,
}

impl Default for LevelAlignment {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            executive: 1.5,
            senior: 1.3,
            mid: 1.2,
            entry: 1.3,
            executive_keywords: owned(&["director", "head", "chief"]),
            senior_keywords: owned(&["senior", "lead"]),
            junior_keywords: owned(&["junior", "entry", "intern"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub base_score: f64,
    /// Added per skill (× relevance/10) found in the title.
    pub title_weight: f64,
    /// Added per skill not already counted, found in the description.
    pub description_weight: f64,
    /// Added per skill not already counted, found in skills used.
    pub skills_used_weight: f64,
    /// Years over which an ended role decays to the floor.
    pub recency_window_years: f64,
    pub recency_floor: f64,
    pub current_role_boost: f64,
    pub level_alignment: LevelAlignment,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            base_score: 1.0,
            title_weight: 0.5,
            description_weight: 0.3,
            skills_used_weight: 0.2,
            recency_window_years: 10.0,
            recency_floor: 0.5,
            current_role_boost: 1.2,
            level_alignment: LevelAlignment::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking algorithm
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RelevanceRanker {
    config: RankingConfig,
}

impl RelevanceRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Scores every experience and returns them highest first.
    ///
    /// score = (base + skill hits) × recency × current-role boost × level alignment
    ///
    /// The sort is stable: equal scores keep their input order. An experience
    /// whose dates do not parse is still ranked, at the recency floor.
    pub fn rank(
        &self,
        experiences: &[Experience],
        skills: &[RequiredSkill],
        job_level: JobLevel,
        as_of: NaiveDate,
    ) -> Vec<RankedExperience> {
        let mut ranked: Vec<RankedExperience> = experiences
            .iter()
            .enumerate()
            .map(|(index, exp)| self.score_experience(index, exp, skills, job_level, as_of))
            .collect();

        ranked.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    fn score_experience(
        &self,
        index: usize,
        exp: &Experience,
        skills: &[RequiredSkill],
        job_level: JobLevel,
        as_of: NaiveDate,
    ) -> RankedExperience {
        let cfg = &self.config;
        let title = exp.title.to_lowercase();
        let description = exp.description.as_deref().unwrap_or("").to_lowercase();
        let skills_used: Vec<String> = exp.skills_used.iter().map(|s| s.to_lowercase()).collect();

        let mut score = cfg.base_score;
        let mut counted = vec![false; skills.len()];

        let mut credit = |hit: &dyn Fn(&str) -> bool, weight: f64, score: &mut f64| {
            for (i, skill) in skills.iter().enumerate() {
                let name = skill.name.trim().to_lowercase();
                if counted[i] || name.is_empty() || !hit(&name) {
                    continue;
                }
                *score += weight * skill.weight();
                counted[i] = true;
            }
        };
        credit(&|name: &str| title.contains(name), cfg.title_weight, &mut score);
        credit(
            &|name: &str| description.contains(name),
            cfg.description_weight,
            &mut score,
        );
        credit(
            &|name: &str| skills_used.iter().any(|used| used.contains(name)),
            cfg.skills_used_weight,
            &mut score,
        );

        let matching_skills = skills
            .iter()
            .zip(&counted)
            .filter(|(_, hit)| **hit)
            .map(|(skill, _)| skill.name.clone())
            .collect();

        let (duration_years, recency, is_current) = match exp.period(as_of) {
            Ok(period) => {
                let decay = 1.0 - period.years_since_end(as_of) / cfg.recency_window_years;
                (
                    Some(round2(period.duration_years())),
                    decay.max(cfg.recency_floor).min(1.0),
                    period.is_current,
                )
            }
            Err(e) => {
                warn!(
                    "Ranking experience {} ({} at {}) at the recency floor: {e}",
                    index, exp.title, exp.company
                );
                (None, cfg.recency_floor, exp.is_open_ended())
            }
        };

        let current_boost = if is_current {
            cfg.current_role_boost
        } else {
            1.0
        };

        let relevance_score = round2(
            score * recency * current_boost * self.level_factor(&title, job_level),
        );

        RankedExperience {
            index,
            company: exp.company.clone(),
            title: exp.title.clone(),
            duration_years,
            relevance_score,
            matching_skills,
            is_current,
        }
    }

    fn level_factor(&self, title: &str, job_level: JobLevel) -> f64 {
        let align = &self.config.level_alignment;
        let has = |words: &Vec<String>| words.iter().any(|w| title.contains(w.as_str()));

        match job_level {
            JobLevel::Executive if has(&align.executive_keywords) => align.executive,
            JobLevel::Senior if has(&align.senior_keywords) => align.senior,
            JobLevel::Mid if !has(&align.junior_keywords) => align.mid,
            JobLevel::Entry if has(&align.junior_keywords) => align.entry,
            JobLevel::Entry
            | JobLevel::Mid
            | JobLevel::Senior
            | JobLevel::Principal
            | JobLevel::Executive => 1.0,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
