//! cradle-curation - Milestone Content Curation Service
//!
//! **Module Identity:**
//! - Name: cradle-curation
//! - Port: 5731 (default)
//!
//! Maintains the developmental milestone catalog, admits deduplicated
//! content units, scores milestone/content pairs through an external
//! relevance classifier, promotes high-scoring pairs to pending mappings,
//! and serves the curator review workflow and coverage reports.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cradle_curation::services::ClassifierClient;
use cradle_curation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cradle-curation service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Step 1: Load TOML configuration (missing file is fine, defaults apply)
    let toml_config = cradle_common::config::load_toml_config_or_default();

    // Step 2: Resolve database path (CLI → ENV → TOML → default)
    let cli_db = std::env::args().nth(1);
    let db_path = cradle_common::config::resolve_database_path(cli_db.as_deref(), &toml_config);
    info!("Database: {}", db_path.display());

    // Step 3: Open or create database and initialize tables
    let db_pool = cradle_curation::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    // Step 4: Construct the relevance classifier client
    let base_url = cradle_curation::config::resolve_classifier_base_url(&toml_config)?;
    let api_key =
        cradle_curation::config::resolve_classifier_api_key(&db_pool, &toml_config).await?;
    if api_key.is_none() {
        info!("No classifier API key configured, sending unauthenticated requests");
    }
    let classifier = ClassifierClient::new(base_url, api_key)?;

    // Create application state
    let state = AppState::new(db_pool, Arc::new(classifier));

    // Build router
    let app = cradle_curation::build_router(state);

    // Start server
    let bind_address = cradle_common::config::resolve_bind_address(&toml_config);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
