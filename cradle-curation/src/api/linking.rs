//! Scoring and auto-linking API handlers
//!
//! POST /api/score runs the candidate scorer for one milestone;
//! POST /api/link/auto promotes scores at or above a threshold.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::{CandidateScorer, LinkRunSummary, ScoreRunSummary};
use crate::AppState;

/// POST /api/score request
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub milestone_id: Uuid,
    /// Restrict the run to specific units; defaults to all active units
    #[serde(default)]
    pub content_unit_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub force_refresh: bool,
}

/// POST /api/score
///
/// Classifier failures are tallied in `skipped`, never surfaced as a hard
/// failure of the run.
pub async fn score_candidates(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> ApiResult<Json<ScoreRunSummary>> {
    let milestone = crate::db::milestones::get_milestone(&state.db, request.milestone_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Milestone not found: {}", request.milestone_id))
        })?;

    let content_units = match request.content_unit_ids {
        Some(ids) => crate::db::content_units::get_content_units(&state.db, &ids).await?,
        None => crate::db::content_units::list_active(&state.db).await?,
    };

    let scorer = CandidateScorer::new(state.db.clone(), state.classifier.clone());
    let summary = scorer
        .score_candidates(&milestone, &content_units, request.force_refresh)
        .await?;

    Ok(Json(summary))
}

/// POST /api/link/auto request
#[derive(Debug, Deserialize)]
pub struct AutoLinkRequest {
    /// Minimum relevance score (0-5) for promotion; caller-supplied, no
    /// implicit default
    pub threshold: i64,
}

/// POST /api/link/auto
pub async fn auto_link(
    State(state): State<AppState>,
    Json(request): Json<AutoLinkRequest>,
) -> ApiResult<Json<LinkRunSummary>> {
    let summary = crate::services::auto_link(&state.db, request.threshold).await?;
    Ok(Json(summary))
}

/// Build linking routes
pub fn linking_routes() -> Router<AppState> {
    Router::new()
        .route("/api/score", post(score_candidates))
        .route("/api/link/auto", post(auto_link))
}
