use serde::{Deserialize, Serialize};

use crate::models::requirements::{RequiredSkill, SkillCategory};

/// Fit bucket derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitCategory {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Lower bounds (inclusive) of each fit bucket on the 0 – 100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitThresholds {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl Default for FitThresholds {
    fn default() -> Self {
        Self {
            excellent: 85.0,
            good: 70.0,
            fair: 50.0,
        }
    }
}

impl FitCategory {
    pub fn from_score(score: f64, thresholds: &FitThresholds) -> FitCategory {
        if score >= thresholds.excellent {
            FitCategory::Excellent
        } else if score >= thresholds.good {
            FitCategory::Good
        } else if score >= thresholds.fair {
            FitCategory::Fair
        } else {
            FitCategory::Poor
        }
    }
}

/// A required skill paired with the candidate skill that satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSkill {
    pub job_skill: String,
    pub skill_name: String,
    pub category: SkillCategory,
    /// Name similarity, blended with years when both sides record them. 0.6 – 1.0.
    pub match_score: f64,
    pub years_experience: Option<u32>,
    pub years_required: Option<u32>,
    /// match_score × relevance / 10
    pub relevance_weighted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchSummary {
    /// 0 – 100
    pub score: f64,
    pub matched: Vec<MatchedSkill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceMatch {
    /// 0 – 100
    pub score: f64,
    pub total_years: f64,
    pub relevant_years: f64,
    pub required_years: Option<u32>,
    pub sufficient: bool,
    /// Experiences left out of the totals because their dates did not parse.
    pub skipped_entries: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationMatchDetail {
    pub job_requirement: String,
    pub candidate_education: String,
    pub level_match: f64,
    pub field_match: f64,
    pub match_score: f64,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationMatch {
    /// 0 – 100
    pub score: f64,
    pub matches: Vec<EducationMatchDetail>,
    pub has_required: bool,
}

/// One candidate experience with its relevance to the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedExperience {
    /// Position of the experience in the candidate profile.
    pub index: usize,
    pub company: String,
    pub title: String,
    pub duration_years: Option<f64>,
    pub relevance_score: f64,
    pub matching_skills: Vec<String>,
    pub is_current: bool,
}

/// Output of the scoring engine for one (candidate, job) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// skill × 0.5 + experience × 0.3 + education × 0.2, on 0 – 100.
    pub overall_score: f64,
    pub fit_category: FitCategory,
    pub skill_match: SkillMatchSummary,
    pub experience_match: ExperienceMatch,
    pub education_match: EducationMatch,
    pub relevant_experiences: Vec<RankedExperience>,
    pub missing_skills: Vec<RequiredSkill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_category_thresholds() {
        let t = FitThresholds::default();
        assert_eq!(FitCategory::from_score(100.0, &t), FitCategory::Excellent);
        assert_eq!(FitCategory::from_score(85.0, &t), FitCategory::Excellent);
        assert_eq!(FitCategory::from_score(84.99, &t), FitCategory::Good);
        assert_eq!(FitCategory::from_score(70.0, &t), FitCategory::Good);
        assert_eq!(FitCategory::from_score(50.0, &t), FitCategory::Fair);
        assert_eq!(FitCategory::from_score(49.9, &t), FitCategory::Poor);
        assert_eq!(FitCategory::from_score(0.0, &t), FitCategory::Poor);
    }

    #[test]
    fn test_fit_category_is_monotonic() {
        let t = FitThresholds::default();
        let mut previous = FitCategory::Poor;
        for step in 0..=1000 {
            let score = f64::from(step) / 10.0;
            let category = FitCategory::from_score(score, &t);
            assert!(category >= previous, "category dropped at {score}");
            previous = category;
        }
    }
}
