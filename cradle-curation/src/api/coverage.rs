//! Coverage and curation-view API handlers (read-only)

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::models::Category;
use crate::services::{
    AgeRangeGroup, CategoryCoverage, CurationStats, DomainDistribution,
};
use crate::AppState;

/// GET /api/curation/view query parameters
#[derive(Debug, Deserialize)]
pub struct CurationViewQuery {
    pub category: Option<Category>,
}

/// GET /api/curation/view
///
/// Age-bucketed timeline of milestones with their linked and candidate
/// content. The category filter narrows entries without changing the
/// bucket set.
pub async fn curation_view(
    State(state): State<AppState>,
    Query(query): Query<CurationViewQuery>,
) -> ApiResult<Json<Vec<AgeRangeGroup>>> {
    let view = crate::services::get_curation_view(&state.db, query.category).await?;
    Ok(Json(view))
}

/// GET /api/curation/stats
pub async fn curation_stats(State(state): State<AppState>) -> ApiResult<Json<CurationStats>> {
    let stats = crate::services::get_curation_stats(&state.db).await?;
    Ok(Json(stats))
}

/// GET /api/coverage/categories
pub async fn category_coverage(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CategoryCoverage>>> {
    let coverage = crate::services::get_category_coverage(&state.db).await?;
    Ok(Json(coverage))
}

/// GET /api/coverage/domains
pub async fn domain_distribution(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DomainDistribution>>> {
    let distribution = crate::services::get_domain_distribution(&state.db).await?;
    Ok(Json(distribution))
}

/// Build coverage routes
pub fn coverage_routes() -> Router<AppState> {
    Router::new()
        .route("/api/curation/view", get(curation_view))
        .route("/api/curation/stats", get(curation_stats))
        .route("/api/coverage/categories", get(category_coverage))
        .route("/api/coverage/domains", get(domain_distribution))
}
