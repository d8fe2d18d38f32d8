//! cradle-curation library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::Classify;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Relevance classifier used by the candidate scorer
    pub classifier: Arc<dyn Classify>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, classifier: Arc<dyn Classify>) -> Self {
        Self {
            db,
            classifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::catalog_routes())
        .merge(api::content_routes())
        .merge(api::linking_routes())
        .merge(api::mapping_routes())
        .merge(api::coverage_routes())
        .merge(api::health_routes())
        .with_state(state)
}
