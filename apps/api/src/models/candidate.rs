use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::models::content_id;
use crate::models::job::Location;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonName {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub last: String,
}

impl PersonName {
    pub fn full(&self) -> String {
        format!("{} {}", self.first.trim(), self.last.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSkill {
    pub name: String,
    #[serde(default)]
    pub years: Option<u32>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub company: String,
    pub title: String,
    /// `YYYY-MM` (a trailing `-DD` is tolerated).
    pub start_date: String,
    /// Absent, `present` or `current` for an open-ended role.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub skills_used: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Resolved date range of an experience.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExperiencePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_current: bool,
}

impl ExperiencePeriod {
    /// Whole years plus month difference over 12.
    pub fn duration_years(&self) -> f64 {
        let years = f64::from(self.end.year() - self.start.year());
        let months = f64::from(self.end.month() as i32 - self.start.month() as i32);
        years + months / 12.0
    }

    pub fn years_since_end(&self, today: NaiveDate) -> f64 {
        (today - self.end).num_days() as f64 / 365.0
    }
}

impl Experience {
    pub fn is_open_ended(&self) -> bool {
        parse_end_marker(self.end_date.as_deref()).is_none()
    }

    /// Resolves the start/end strings; open-ended roles end on `today`.
    pub fn period(&self, today: NaiveDate) -> Result<ExperiencePeriod, ValidationError> {
        let start = parse_month("start_date", &self.start_date)?;
        let (end, is_current) = match parse_end_marker(self.end_date.as_deref()) {
            Some(raw) => (parse_month("end_date", raw)?, false),
            None => (today, true),
        };
        if end < start {
            return Err(ValidationError::InvertedRange {
                start: self.start_date.clone(),
                end: self.end_date.clone().unwrap_or_default(),
            });
        }
        Ok(ExperiencePeriod {
            start,
            end,
            is_current,
        })
    }
}

/// Returns the end date string, or None when the role is open-ended.
fn parse_end_marker(end: Option<&str>) -> Option<&str> {
    let end = end?.trim();
    if end.is_empty()
        || end.eq_ignore_ascii_case("present")
        || end.eq_ignore_ascii_case("current")
        || end.eq_ignore_ascii_case("now")
    {
        None
    } else {
        Some(end)
    }
}

fn parse_month(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    let invalid = || ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    };
    let mut parts = raw.splitn(3, '-');
    let year: i32 = parts
        .next()
        .and_then(|y| y.parse().ok())
        .ok_or_else(invalid)?;
    let month: u32 = parts
        .next()
        .and_then(|m| m.parse().ok())
        .ok_or_else(invalid)?;
    let day: u32 = match parts.next() {
        Some(d) => d.parse().map_err(|_| invalid())?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EducationEntry {
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub graduation_date: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A candidate's professional profile. Owned by the caller and never mutated by the pipeline.
///
/// A profile submitted without an id gets one derived from the name and email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "CandidateProfileInput")]
pub struct CandidateProfile {
    pub id: Uuid,
    #[serde(default)]
    pub name: PersonName,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<CandidateSkill>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
}

#[derive(Deserialize)]
struct CandidateProfileInput {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    name: PersonName,
    #[serde(default)]
    title: String,
    #[serde(default)]
    contact: ContactInfo,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    skills: Vec<CandidateSkill>,
    #[serde(default)]
    experiences: Vec<Experience>,
    #[serde(default)]
    education: Vec<EducationEntry>,
    #[serde(default)]
    certifications: Vec<Certification>,
}

impl From<CandidateProfileInput> for CandidateProfile {
    fn from(input: CandidateProfileInput) -> Self {
        let id = input.id.unwrap_or_else(|| {
            content_id(&[
                input.name.first.as_str(),
                input.name.last.as_str(),
                input.contact.email.as_str(),
            ])
        });
        Self {
            id,
            name: input.name,
            title: input.title,
            contact: input.contact,
            summary: input.summary,
            skills: input.skills,
            experiences: input.experiences,
            education: input.education,
            certifications: input.certifications,
        }
    }
}
