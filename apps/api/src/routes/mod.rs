pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs/analyze", post(handlers::handle_analyze))
        .route("/api/v1/match", post(handlers::handle_match))
        .route("/api/v1/resumes/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/resumes/:candidate_id/:job_id",
            get(handlers::handle_get_resume),
        )
        .route(
            "/api/v1/resumes/:candidate_id/:job_id/render",
            post(handlers::handle_render),
        )
        .with_state(state)
}
