//! Content admission API handlers
//!
//! POST /api/content runs the dedup guard: duplicate normalized text in
//! the same domain is a 409 and nothing is stored.

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::NewContentUnit;
use crate::AppState;

/// POST /api/content response
#[derive(Debug, Serialize)]
pub struct AdmitContentResponse {
    pub id: Uuid,
    pub content_hash: String,
}

/// POST /api/content
pub async fn admit_content(
    State(state): State<AppState>,
    Json(request): Json<NewContentUnit>,
) -> ApiResult<Json<AdmitContentResponse>> {
    let unit = crate::services::admit_content_unit(&state.db, request).await?;

    Ok(Json(AdmitContentResponse {
        id: unit.id,
        content_hash: unit.content_hash,
    }))
}

/// Build content routes
pub fn content_routes() -> Router<AppState> {
    Router::new().route("/api/content", post(admit_content))
}
