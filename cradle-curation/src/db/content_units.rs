//! Content unit persistence
//!
//! Units are written once at admission (via the dedup guard); the
//! content_hash is computed at creation and never changes.

use crate::models::{Category, Classification, ContentKind, ContentUnit, SourceType};
use cradle_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a content unit
pub async fn insert_content_unit(pool: &SqlitePool, unit: &ContentUnit) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO content_units (
            id, kind, domain, sub_domain, week, text, content_hash,
            developmental_tag, classification_source, classification_confidence,
            lineage, active, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(unit.id.to_string())
    .bind(unit.kind.as_str())
    .bind(&unit.domain)
    .bind(&unit.sub_domain)
    .bind(unit.week)
    .bind(&unit.text)
    .bind(&unit.content_hash)
    .bind(unit.developmental_tag.map(|t| t.as_str()))
    .bind(unit.classification.source_str())
    .bind(unit.classification.confidence())
    .bind(unit.lineage.as_str())
    .bind(unit.active as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a content unit by id
pub async fn get_content_unit(pool: &SqlitePool, id: Uuid) -> Result<Option<ContentUnit>> {
    let row = sqlx::query(
        r#"
        SELECT id, kind, domain, sub_domain, week, text, content_hash,
               developmental_tag, classification_source, classification_confidence,
               lineage, active
        FROM content_units
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|row| content_unit_from_row(&row)).transpose()
}

/// Find an active unit with the given hash in the given domain
///
/// This is the dedup guard's collision probe: same hash in a different
/// domain is not a collision.
pub async fn find_active_by_hash(
    pool: &SqlitePool,
    domain: &str,
    content_hash: &str,
) -> Result<Option<Uuid>> {
    let id: Option<String> = sqlx::query_scalar(
        "SELECT id FROM content_units WHERE domain = ? AND content_hash = ? AND active = 1 LIMIT 1",
    )
    .bind(domain)
    .bind(content_hash)
    .fetch_optional(pool)
    .await?;

    id.map(|s| {
        Uuid::parse_str(&s).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
    })
    .transpose()
}

/// List all active content units
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<ContentUnit>> {
    let rows = sqlx::query(
        r#"
        SELECT id, kind, domain, sub_domain, week, text, content_hash,
               developmental_tag, classification_source, classification_confidence,
               lineage, active
        FROM content_units
        WHERE active = 1
        ORDER BY week, domain
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(content_unit_from_row).collect()
}

/// Load several content units by id, skipping unknown ids
pub async fn get_content_units(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<ContentUnit>> {
    let mut units = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(unit) = get_content_unit(pool, *id).await? {
            units.push(unit);
        }
    }
    Ok(units)
}

/// Count active content units tagged with a domain
pub async fn count_by_domain(pool: &SqlitePool, domain: &str) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM content_units WHERE domain = ? AND active = 1")
            .bind(domain)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

fn content_unit_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ContentUnit> {
    let id_str: String = row.get("id");
    let kind_str: String = row.get("kind");
    let tag_str: Option<String> = row.get("developmental_tag");
    let source_str: String = row.get("classification_source");
    let confidence: Option<f64> = row.get("classification_confidence");
    let lineage_str: String = row.get("lineage");
    let active: i64 = row.get("active");

    Ok(ContentUnit {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?,
        kind: ContentKind::parse(&kind_str)?,
        domain: row.get("domain"),
        sub_domain: row.get("sub_domain"),
        week: row.get("week"),
        text: row.get("text"),
        content_hash: row.get("content_hash"),
        developmental_tag: tag_str.as_deref().map(Category::parse).transpose()?,
        classification: Classification::from_columns(&source_str, confidence)?,
        lineage: SourceType::parse(&lineage_str)?,
        active: active != 0,
    })
}
