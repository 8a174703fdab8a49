use serde::{Deserialize, Serialize};

/// Category of a required skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Technical,
    Soft,
    Domain,
}

/// Seniority of a role, lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Principal,
    Executive,
}

impl JobLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobLevel::Entry => "entry",
            JobLevel::Mid => "mid",
            JobLevel::Senior => "senior",
            JobLevel::Principal => "principal",
            JobLevel::Executive => "executive",
        }
    }

    /// Level implied by a years-of-experience requirement.
    /// ≤2 entry, ≤5 mid, ≤8 senior, otherwise principal. Unknown years → mid.
    pub fn from_years(years: Option<u32>) -> JobLevel {
        match years {
            None => JobLevel::Mid,
            Some(y) if y <= 2 => JobLevel::Entry,
            Some(y) if y <= 5 => JobLevel::Mid,
            Some(y) if y <= 8 => JobLevel::Senior,
            Some(_) => JobLevel::Principal,
        }
    }
}

/// Ordinal degree ladder used to compare education levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

/// Keywords recognizing a degree level in free text, checked in order.
const DEGREE_KEYWORDS: &[(&str, DegreeLevel)] = &[
    ("high school", DegreeLevel::HighSchool),
    ("associate", DegreeLevel::Associate),
    ("bachelor", DegreeLevel::Bachelor),
    ("master", DegreeLevel::Master),
    ("mba", DegreeLevel::Master),
    ("phd", DegreeLevel::Doctorate),
    ("ph.d", DegreeLevel::Doctorate),
    ("doctorate", DegreeLevel::Doctorate),
    ("doctoral", DegreeLevel::Doctorate),
];

impl DegreeLevel {
    /// Level named by a free-text degree such as "Bachelor's" or "MBA".
    pub fn from_text(text: &str) -> Option<DegreeLevel> {
        let text = text.to_lowercase();
        DEGREE_KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, level)| *level)
    }

    /// 1 (high school) through 5 (doctorate).
    pub fn ordinal(&self) -> u8 {
        match self {
            DegreeLevel::HighSchool => 1,
            DegreeLevel::Associate => 2,
            DegreeLevel::Bachelor => 3,
            DegreeLevel::Master => 4,
            DegreeLevel::Doctorate => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DegreeLevel::HighSchool => "High School",
            DegreeLevel::Associate => "Associate's",
            DegreeLevel::Bachelor => "Bachelor's",
            DegreeLevel::Master => "Master's",
            DegreeLevel::Doctorate => "PhD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredSkill {
    pub name: String,
    pub category: SkillCategory,
    /// 1 – 10
    pub relevance: u8,
    #[serde(default)]
    pub years_required: Option<u32>,
}

impl RequiredSkill {
    /// Relevance as a 0.1 – 1.0 weight.
    pub fn weight(&self) -> f64 {
        f64::from(self.relevance.clamp(1, 10)) / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRequirement {
    /// Free-text degree level, e.g. "Bachelor's".
    pub level: String,
    /// Field of study; empty means any field.
    pub field: String,
    pub required: bool,
}

/// Structured requirements derived from a job posting.
///
/// Produced whole by the extraction engine and replaced whole on re-extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirementProfile {
    pub skills: Vec<RequiredSkill>,
    pub experience_years: Option<u32>,
    pub education: Vec<EducationRequirement>,
    pub job_level: JobLevel,
    pub keywords: Vec<String>,
    pub summary: String,
}
