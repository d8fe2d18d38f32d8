//! Milestone catalog API handlers
//!
//! GET /api/milestones, POST /api/milestones/import,
//! POST /api/milestones/:id/deactivate

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{Category, Milestone, MilestoneSeed};
use crate::AppState;

/// GET /api/milestones query parameters
#[derive(Debug, Deserialize)]
pub struct ListMilestonesQuery {
    pub category: Option<Category>,
    /// Include deactivated entries (default false)
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/milestones
///
/// List the catalog, optionally restricted to one category.
pub async fn list_milestones(
    State(state): State<AppState>,
    Query(query): Query<ListMilestonesQuery>,
) -> ApiResult<Json<Vec<Milestone>>> {
    let milestones = crate::db::milestones::list_milestones(
        &state.db,
        query.category,
        !query.include_inactive,
    )
    .await?;

    Ok(Json(milestones))
}

/// POST /api/milestones/import request
#[derive(Debug, Deserialize)]
pub struct ImportCatalogRequest {
    pub milestones: Vec<MilestoneSeed>,
}

/// POST /api/milestones/import response
#[derive(Debug, Serialize)]
pub struct ImportCatalogResponse {
    pub imported: usize,
}

/// POST /api/milestones/import
///
/// Seed-import catalog entries. Upserts keyed by (category, title), so
/// re-running an import is safe.
pub async fn import_catalog(
    State(state): State<AppState>,
    Json(request): Json<ImportCatalogRequest>,
) -> ApiResult<Json<ImportCatalogResponse>> {
    let imported = request.milestones.len();

    for seed in request.milestones {
        let milestone = Milestone::from_seed(seed);
        crate::db::milestones::upsert_milestone(&state.db, &milestone).await?;
    }

    tracing::info!(imported, "Milestone catalog import completed");

    Ok(Json(ImportCatalogResponse { imported }))
}

/// POST /api/milestones/:id/deactivate
///
/// Catalog entries are never deleted, only deactivated.
pub async fn deactivate_milestone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    crate::db::milestones::deactivate_milestone(&state.db, id).await?;
    Ok(Json(serde_json::json!({ "deactivated": id })))
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/milestones", get(list_milestones))
        .route("/api/milestones/import", post(import_catalog))
        .route("/api/milestones/:id/deactivate", post(deactivate_milestone))
}
