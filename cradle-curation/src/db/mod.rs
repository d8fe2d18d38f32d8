//! Database access for cradle-curation
//!
//! SQLite store holding the milestone catalog, content units, candidate
//! scores, and mappings. Tables are created at startup if missing.

pub mod content_units;
pub mod mappings;
pub mod milestones;
pub mod scores;
pub mod settings;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize curation engine tables
///
/// candidate_scores carries the store-level unique constraint on the
/// (milestone_id, content_unit_id) pair; mapping uniqueness is enforced at
/// the application level before insert.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    cradle_common::db::create_settings_table(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS milestones (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            target_month INTEGER NOT NULL,
            min_month INTEGER,
            max_month INTEGER,
            source TEXT,
            display_order INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(category, title)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_units (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            domain TEXT NOT NULL,
            sub_domain TEXT,
            week INTEGER NOT NULL,
            text TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            developmental_tag TEXT,
            classification_source TEXT NOT NULL,
            classification_confidence REAL,
            lineage TEXT NOT NULL DEFAULT 'v2',
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidate_scores (
            milestone_id TEXT NOT NULL,
            content_unit_id TEXT NOT NULL,
            relevance_score INTEGER NOT NULL,
            reasoning TEXT NOT NULL DEFAULT '',
            scored_at TEXT NOT NULL,
            UNIQUE(milestone_id, content_unit_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mappings (
            id TEXT PRIMARY KEY,
            milestone_id TEXT,
            domain TEXT,
            quiz_id TEXT,
            topic_id TEXT,
            weight REAL NOT NULL,
            is_auto_generated INTEGER NOT NULL DEFAULT 0,
            verified_by_curator INTEGER NOT NULL DEFAULT 0,
            verified_at TEXT,
            verified_by TEXT,
            notes TEXT,
            source_type TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Database tables initialized (settings, milestones, content_units, candidate_scores, mappings)"
    );

    Ok(())
}
