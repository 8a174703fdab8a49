use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::content_id;
use crate::models::requirements::JobRequirementProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Location {
    /// "City, State, Country" with missing parts skipped.
    pub fn display(&self) -> String {
        [&self.city, &self.state, &self.country]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A normalized job posting as supplied by the job source collaborator.
///
/// A posting submitted without an id gets one derived from its title, company
/// and description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "JobPostingInput")]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    /// Requirement profile previously extracted for this job, if any.
    #[serde(default)]
    pub analysis: Option<JobRequirementProfile>,
}

#[derive(Deserialize)]
struct JobPostingInput {
    #[serde(default)]
    id: Option<Uuid>,
    title: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    job_url: Option<String>,
    #[serde(default)]
    analysis: Option<JobRequirementProfile>,
}

impl From<JobPostingInput> for JobPosting {
    fn from(input: JobPostingInput) -> Self {
        let id = input.id.unwrap_or_else(|| {
            content_id(&[
                input.title.as_str(),
                input.company_name.as_str(),
                input.description.as_deref().unwrap_or(""),
            ])
        });
        Self {
            id,
            title: input.title,
            company_name: input.company_name,
            location: input.location,
            description: input.description,
            job_url: input.job_url,
            analysis: input.analysis,
        }
    }
}

impl JobPosting {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("").trim()
    }

    pub fn company_or_default(&self) -> &str {
        let company = self.company_name.trim();
        if company.is_empty() {
            "the hiring company"
        } else {
            company
        }
    }
}
