//! Mapping and curation API handlers
//!
//! GET/POST /api/mappings, verify, verify-batch, DELETE

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{ContentRef, LinkAnchor, Mapping};
use crate::services::BatchOutcome;
use crate::AppState;

/// GET /api/mappings query parameters
#[derive(Debug, Deserialize)]
pub struct ListMappingsQuery {
    pub verified: Option<bool>,
}

/// GET /api/mappings
pub async fn list_mappings(
    State(state): State<AppState>,
    Query(query): Query<ListMappingsQuery>,
) -> ApiResult<Json<Vec<Mapping>>> {
    let mappings = crate::db::mappings::list_mappings(&state.db, query.verified).await?;
    Ok(Json(mappings))
}

/// POST /api/mappings request
///
/// Exactly one of milestone_id/domain and exactly one of quiz_id/topic_id;
/// any other combination is a validation error.
#[derive(Debug, Deserialize)]
pub struct CreateMappingRequest {
    pub milestone_id: Option<Uuid>,
    pub domain: Option<String>,
    pub quiz_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
}

/// POST /api/mappings
///
/// Manual link. Idempotent: returns the existing row when the identical
/// mapping already exists.
pub async fn create_mapping(
    State(state): State<AppState>,
    Json(request): Json<CreateMappingRequest>,
) -> ApiResult<Json<Mapping>> {
    let anchor = LinkAnchor::from_columns(request.milestone_id, request.domain.as_deref())?;
    let content = ContentRef::from_columns(request.quiz_id, request.topic_id)?;

    let mapping = crate::services::create_mapping(&state.db, anchor, content).await?;
    Ok(Json(mapping))
}

/// POST /api/mappings/:id/verify request
#[derive(Debug, Deserialize)]
pub struct VerifyMappingRequest {
    pub curator: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/mappings/:id/verify
pub async fn verify_mapping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VerifyMappingRequest>,
) -> ApiResult<Json<Mapping>> {
    let mapping =
        crate::services::verify_mapping(&state.db, id, &request.curator, request.notes).await?;
    Ok(Json(mapping))
}

/// POST /api/mappings/verify-batch request
#[derive(Debug, Deserialize)]
pub struct VerifyBatchRequest {
    pub ids: Vec<Uuid>,
    pub curator: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /api/mappings/verify-batch
///
/// Per-id commits; the response reports each id's outcome independently.
pub async fn verify_batch(
    State(state): State<AppState>,
    Json(request): Json<VerifyBatchRequest>,
) -> ApiResult<Json<Vec<BatchOutcome>>> {
    let outcomes =
        crate::services::verify_batch(&state.db, &request.ids, &request.curator, request.notes)
            .await;
    Ok(Json(outcomes))
}

/// DELETE /api/mappings/:id
///
/// Curator rejection: removes the mapping outright. The underlying
/// candidate score is preserved.
pub async fn delete_mapping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    crate::services::delete_mapping(&state.db, id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// Build mapping routes
pub fn mapping_routes() -> Router<AppState> {
    Router::new()
        .route("/api/mappings", get(list_mappings).post(create_mapping))
        .route("/api/mappings/:id/verify", post(verify_mapping))
        .route("/api/mappings/verify-batch", post(verify_batch))
        .route("/api/mappings/:id", delete(delete_mapping))
}
