use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and active backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api",
        "llm_provider": state.config.llm.provider.as_str(),
        "scorer": state.pipeline.scorer_backend(),
        "renderer": state.renderer.format(),
    }))
}
