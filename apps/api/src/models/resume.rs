use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::{Certification, ContactInfo, EducationEntry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeHeader {
    pub name: String,
    pub title: String,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsSection {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub domain: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeExperience {
    pub company: String,
    pub title: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub achievements: Vec<String>,
    pub skills_used: Vec<String>,
    /// 0-based position in the relevance ranking.
    pub relevance_rank: usize,
    /// True when `achievements` were rewritten for this job.
    pub tailored: bool,
}

/// Resume content for one (candidate, job) pair, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeContent {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub header: ResumeHeader,
    pub summary: String,
    pub skills: SkillsSection,
    pub experience: Vec<ResumeExperience>,
    pub education: Vec<EducationEntry>,
    pub certifications: Vec<Certification>,
}
