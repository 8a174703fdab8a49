//! Axum route handlers for the resume pipeline API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::pipeline::RunState;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::models::match_result::MatchResult;
use crate::models::requirements::JobRequirementProfile;
use crate::models::resume::ResumeContent;
use crate::render::RenderedArtifact;
use crate::state::AppState;
use crate::store::ResumeRecord;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub job: JobPosting,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub requirements: JobRequirementProfile,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub candidate: CandidateProfile,
    pub job: JobPosting,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub match_result: MatchResult,
    pub requirements: JobRequirementProfile,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub candidate: CandidateProfile,
    pub job: JobPosting,
    /// Write a document artifact as well. Defaults to true.
    #[serde(default = "render_by_default")]
    pub render: bool,
}

fn render_by_default() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub resume: ResumeContent,
    pub match_result: MatchResult,
    pub artifact: Option<RenderedArtifact>,
    pub render_error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs/analyze
///
/// Re-extracts the job's requirements, replacing any cached profile. Stored
/// results for the job were computed from the old profile and are dropped.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_job(&request.job)?;

    let requirements = state.pipeline.analyze(&request.job).await;
    let dropped = state.store.invalidate_job(request.job.id).await;
    if dropped > 0 {
        info!("Dropped {dropped} stored results for re-analyzed job {}", request.job.id);
    }

    Ok(Json(AnalyzeResponse {
        requirements: requirements.as_ref().clone(),
    }))
}

/// POST /api/v1/match
///
/// Scores the candidate against the job. Uses the cached requirement profile when there is one.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    validate_job(&request.job)?;

    let run = state
        .pipeline
        .match_candidate(&request.candidate, &request.job, today())
        .await?;
    let (requirements, match_result) = finished_match(&run)?;

    state
        .store
        .save(record(&request.candidate, &request.job, match_result.clone(), None, None))
        .await;

    Ok(Json(MatchResponse {
        match_result,
        requirements,
    }))
}

/// POST /api/v1/resumes/generate
///
/// Full pipeline: requirements → match → tailored content → optional render.
/// A render failure is reported alongside the content, which is stored regardless.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    validate_job(&request.job)?;

    let run = state
        .pipeline
        .generate_resume(&request.candidate, &request.job, today())
        .await?;
    let (_, match_result) = finished_match(&run)?;
    let resume = run.resume().cloned().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Pipeline stopped at state '{}'", run.name()))
    })?;

    let (artifact, render_error) = if request.render {
        match state
            .renderer
            .render(&resume, &request.candidate.name, &request.job.company_name)
            .await
        {
            Ok(artifact) => (Some(artifact), None),
            Err(e) => {
                warn!(
                    "Rendering resume for candidate {} / job {} failed: {e}",
                    request.candidate.id, request.job.id
                );
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    state
        .store
        .save(record(
            &request.candidate,
            &request.job,
            match_result.clone(),
            Some(resume.clone()),
            artifact.as_ref().map(|a| a.path.clone()),
        ))
        .await;

    Ok(Json(GenerateResponse {
        resume,
        match_result,
        artifact,
        render_error,
    }))
}

/// GET /api/v1/resumes/:candidate_id/:job_id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path((candidate_id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state
        .store
        .get(candidate_id, job_id)
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No result for candidate {candidate_id} and job {job_id}"
            ))
        })?;
    Ok(Json(record))
}

/// POST /api/v1/resumes/:candidate_id/:job_id/render
///
/// Renders a stored resume again. Here a render failure is the response.
pub async fn handle_render(
    State(state): State<AppState>,
    Path((candidate_id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RenderedArtifact>, AppError> {
    let mut record = state
        .store
        .get(candidate_id, job_id)
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No result for candidate {candidate_id} and job {job_id}"
            ))
        })?;
    let resume = record.resume.as_ref().ok_or_else(|| {
        AppError::NotFound(format!(
            "No resume generated for candidate {candidate_id} and job {job_id}"
        ))
    })?;

    let artifact = state
        .renderer
        .render(resume, &record.candidate_name, &record.company_name)
        .await?;

    record.artifact = Some(artifact.path.clone());
    record.updated_at = Utc::now();
    state.store.save(record).await;

    Ok(Json(artifact))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn validate_job(job: &JobPosting) -> Result<(), AppError> {
    if job.title.trim().is_empty() {
        return Err(AppError::Validation("job title cannot be empty".to_string()));
    }
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn finished_match(run: &RunState) -> Result<(JobRequirementProfile, MatchResult), AppError> {
    match (run.requirements(), run.match_result()) {
        (Some(requirements), Some(result)) => Ok((requirements.as_ref().clone(), result.clone())),
        _ => Err(AppError::Internal(anyhow::anyhow!(
            "Pipeline stopped at state '{}'",
            run.name()
        ))),
    }
}

fn record(
    candidate: &CandidateProfile,
    job: &JobPosting,
    match_result: MatchResult,
    resume: Option<ResumeContent>,
    artifact: Option<String>,
) -> ResumeRecord {
    ResumeRecord {
        candidate_id: candidate.id,
        job_id: job.id,
        candidate_name: candidate.name.clone(),
        company_name: job.company_name.clone(),
        match_result,
        resume,
        artifact,
        updated_at: Utc::now(),
    }
}
