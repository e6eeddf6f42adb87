//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::models::{AnalysisResult, BatchEntry, RankedResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_text: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub resume_text: String,
    pub jobs: Vec<BatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<RankedResult>,
    pub total: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match/analyze
///
/// Analyzes one résumé against one job description. Always 200 once the
/// input is valid; check `processing_status` for provenance.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    require_text("resume_text", &request.resume_text)?;
    require_text("job_text", &request.job_text)?;

    let result = state
        .analyzer
        .analyze(&request.resume_text, &request.job_text)
        .await;

    Ok(Json(result))
}

/// POST /api/v1/match/batch
///
/// Ranks one résumé against many job descriptions, best match first.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    require_text("resume_text", &request.resume_text)?;
    if request.jobs.is_empty() {
        return Err(AppError::Validation("jobs cannot be empty".to_string()));
    }

    let results = state.ranker.rank(&request.resume_text, &request.jobs).await;

    Ok(Json(BatchResponse {
        total: results.len(),
        results,
    }))
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
