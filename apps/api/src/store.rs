//! Persistence collaborator: finished match results and resumes keyed by
//! (candidate id, job id).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::candidate::PersonName;
use crate::models::match_result::MatchResult;
use crate::models::resume::ResumeContent;

/// One stored (candidate, job) outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    /// Inputs for naming a rendered artifact.
    pub candidate_name: PersonName,
    pub company_name: String,
    pub match_result: MatchResult,
    pub resume: Option<ResumeContent>,
    /// Path of the rendered artifact, if rendering succeeded.
    pub artifact: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Inserts or replaces the record for its (candidate, job) key.
    async fn save(&self, record: ResumeRecord);

    async fn get(&self, candidate_id: Uuid, job_id: Uuid) -> Option<ResumeRecord>;

    /// Drops every record for `job_id`; returns how many were removed.
    async fn invalidate_job(&self, job_id: Uuid) -> usize;
}

#[derive(Default)]
pub struct InMemoryResumeStore {
    records: RwLock<HashMap<(Uuid, Uuid), ResumeRecord>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn save(&self, record: ResumeRecord) {
        let key = (record.candidate_id, record.job_id);
        debug!("Storing resume record for candidate {} / job {}", key.0, key.1);
        self.records.write().await.insert(key, record);
    }

    async fn get(&self, candidate_id: Uuid, job_id: Uuid) -> Option<ResumeRecord> {
        self.records
            .read()
            .await
            .get(&(candidate_id, job_id))
            .cloned()
    }

    async fn invalidate_job(&self, job_id: Uuid) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|(_, job), _| *job != job_id);
        before - records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::match_result::{
        EducationMatch, ExperienceMatch, FitCategory, SkillMatchSummary,
    };

    fn record(candidate: u128, job: u128, score: f64) -> ResumeRecord {
        ResumeRecord {
            candidate_id: Uuid::from_u128(candidate),
            job_id: Uuid::from_u128(job),
            candidate_name: PersonName::default(),
            company_name: "Acme".to_string(),
            match_result: MatchResult {
                overall_score: score,
                fit_category: FitCategory::Poor,
                skill_match: SkillMatchSummary {
                    score: 0.0,
                    matched: vec![],
                },
                experience_match: ExperienceMatch {
                    score: 0.0,
                    total_years: 0.0,
                    relevant_years: 0.0,
                    required_years: None,
                    sufficient: false,
                    skipped_entries: vec![],
                },
                education_match: EducationMatch {
                    score: 80.0,
                    matches: vec![],
                    has_required: true,
                },
                relevant_experiences: vec![],
                missing_skills: vec![],
            },
            resume: None,
            artifact: None,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_replaces_by_key() {
        let store = InMemoryResumeStore::new();
        store.save(record(1, 2, 10.0)).await;
        store.save(record(1, 2, 55.0)).await;

        let stored = store.get(Uuid::from_u128(1), Uuid::from_u128(2)).await.unwrap();
        assert_eq!(stored.match_result.overall_score, 55.0);
        assert!(store.get(Uuid::from_u128(2), Uuid::from_u128(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_job_drops_only_that_job() {
        let store = InMemoryResumeStore::new();
        store.save(record(1, 9, 10.0)).await;
        store.save(record(2, 9, 20.0)).await;
        store.save(record(1, 8, 30.0)).await;

        assert_eq!(store.invalidate_job(Uuid::from_u128(9)).await, 2);
        assert!(store.get(Uuid::from_u128(1), Uuid::from_u128(9)).await.is_none());
        assert!(store.get(Uuid::from_u128(1), Uuid::from_u128(8)).await.is_some());
    }
}
