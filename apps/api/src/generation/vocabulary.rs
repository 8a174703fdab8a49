//! Vocabulary tables used by the rule-based extraction fallbacks.
//!
//! Everything here is plain data. `ExtractionConfig` carries a `Vocabulary`
//! so deployments and tests can swap tables without touching the engine.

use serde::{Deserialize, Serialize};

use crate::models::requirements::{DegreeLevel, JobLevel, SkillCategory};

/// A vocabulary skill with the relevance assigned when it is found by rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTerm {
    pub name: String,
    pub category: SkillCategory,
    pub relevance: u8,
}

/// Surface forms that identify one rung of the degree ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeTerms {
    pub level: DegreeLevel,
    pub patterns: Vec<String>,
}

/// Title keywords that pin a job level without asking the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelKeywords {
    pub level: JobLevel,
    /// Case-insensitive substrings; trailing spaces are significant ("sr ").
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub skills: Vec<SkillTerm>,
    pub degrees: Vec<DegreeTerms>,
    /// Fields of study, in display form.
    pub fields: Vec<String>,
    /// Terms worth repeating on a resume when they appear in a posting.
    pub important_terms: Vec<String>,
    /// Checked in order; the first level with a hit wins.
    pub title_levels: Vec<LevelKeywords>,
}

const TECHNICAL: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "React", "Angular", "Vue", "Node.js",
    "SQL", "PostgreSQL", "MySQL", "MongoDB", "Redis", "AWS", "Azure", "GCP", "Docker",
    "Kubernetes", "Terraform", "Git", "C++", "C#", "Rust", "Golang", "Ruby", "PHP",
    "Scala", "Kotlin", "Swift", "HTML", "CSS", "Jenkins", "CI/CD", "REST API", "GraphQL",
    "Kafka", "Spark", "Hadoop", "Linux", "Machine Learning", "TensorFlow", "PyTorch",
    "Data Science", "Agile", "Scrum", "DevOps", "Microservices",
];

const SOFT: &[(&str, u8)] = &[
    ("Communication", 6),
    ("Leadership", 6),
    ("Problem Solving", 6),
    ("Project Management", 6),
    ("Stakeholder Management", 6),
    ("Teamwork", 5),
    ("Critical Thinking", 5),
    ("Collaboration", 5),
    ("Adaptability", 5),
    ("Time Management", 5),
    ("Creativity", 5),
    ("Attention to Detail", 5),
    ("Mentoring", 5),
];

const DOMAIN: &[(&str, u8)] = &[
    ("Fintech", 9),
    ("Cybersecurity", 9),
    ("HIPAA", 9),
    ("PCI DSS", 9),
    ("Healthcare", 8),
    ("E-commerce", 8),
    ("Payments", 8),
    ("Banking", 8),
    ("Insurance", 8),
    ("Blockchain", 8),
    ("Logistics", 8),
    ("Supply Chain", 8),
    ("Telecommunications", 8),
    ("SaaS", 8),
    ("GDPR", 8),
    ("Ad Tech", 8),
    ("EdTech", 8),
    ("Automotive", 8),
    ("Embedded Systems", 8),
    ("Biotech", 8),
];

const DEGREES: &[(DegreeLevel, &[&str])] = &[
    (DegreeLevel::HighSchool, &["high school", "GED"]),
    (
        DegreeLevel::Associate,
        &["associate's degree", "associate degree", "associates degree"],
    ),
    (
        DegreeLevel::Bachelor,
        &["bachelor", "B.S.", "B.A.", "BS degree", "BA degree", "undergraduate degree"],
    ),
    (
        DegreeLevel::Master,
        &["master", "MBA", "M.S.", "MS degree", "graduate degree"],
    ),
    (DegreeLevel::Doctorate, &["PhD", "Ph.D", "doctorate", "doctoral"]),
];

const FIELDS: &[&str] = &[
    "Computer Science", "Computer Engineering", "Software Engineering",
    "Electrical Engineering", "Mechanical Engineering", "Engineering", "Mathematics",
    "Statistics", "Physics", "Data Science", "Information Technology",
    "Information Systems", "Business Administration", "Business", "Finance",
    "Economics", "Accounting", "Marketing", "Design", "Nursing", "Biology", "Chemistry",
];

const IMPORTANT_EXTRA: &[&str] = &[
    "API", "Cloud", "Distributed Systems", "Scalability", "Testing", "Automation",
    "Security", "Performance", "Architecture", "Data Pipelines", "Analytics",
    "Monitoring", "Observability", "Design Patterns", "Code Review", "Unit Testing",
    "Full Stack", "Backend", "Frontend", "Mobile", "Cross-functional",
];

const TITLE_LEVELS: &[(JobLevel, &[&str])] = &[
    (JobLevel::Senior, &["senior", "sr.", "sr ", "lead"]),
    (JobLevel::Principal, &["principal", "staff", "architect"]),
    (JobLevel::Executive, &["director", "head", "vp", "chief"]),
    (JobLevel::Entry, &["junior", "jr.", "jr ", "associate", "entry"]),
];

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        let mut skills: Vec<SkillTerm> = TECHNICAL
            .iter()
            .map(|name| SkillTerm {
                name: name.to_string(),
                category: SkillCategory::Technical,
                relevance: 7,
            })
            .collect();
        skills.extend(SOFT.iter().map(|(name, relevance)| SkillTerm {
            name: name.to_string(),
            category: SkillCategory::Soft,
            relevance: *relevance,
        }));
        skills.extend(DOMAIN.iter().map(|(name, relevance)| SkillTerm {
            name: name.to_string(),
            category: SkillCategory::Domain,
            relevance: *relevance,
        }));

        let mut important_terms = owned(TECHNICAL);
        important_terms.extend(DOMAIN.iter().map(|(name, _)| name.to_string()));
        important_terms.extend(owned(IMPORTANT_EXTRA));

        Self {
            skills,
            degrees: DEGREES
                .iter()
                .map(|(level, patterns)| DegreeTerms {
                    level: *level,
                    patterns: owned(patterns),
                })
                .collect(),
            fields: owned(FIELDS),
            important_terms,
            title_levels: TITLE_LEVELS
                .iter()
                .map(|(level, keywords)| LevelKeywords {
                    level: *level,
                    keywords: owned(keywords),
                })
                .collect(),
        }
    }
}
