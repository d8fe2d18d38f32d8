//! Milestone catalog persistence
//!
//! The catalog is seed-imported and immutable in normal operation:
//! entries are upserted keyed by (category, title), never deleted, only
//! deactivated.

use crate::models::{Category, Milestone};
use cradle_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Upsert a catalog entry keyed by (category, title)
///
/// Re-importing an existing entry updates its descriptive fields but keeps
/// the original id, so existing scores and mappings stay attached.
pub async fn upsert_milestone(pool: &SqlitePool, milestone: &Milestone) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO milestones (
            id, title, description, category, target_month, min_month, max_month,
            source, display_order, active, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(category, title) DO UPDATE SET
            description = excluded.description,
            target_month = excluded.target_month,
            min_month = excluded.min_month,
            max_month = excluded.max_month,
            source = excluded.source,
            display_order = excluded.display_order,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(milestone.id.to_string())
    .bind(&milestone.title)
    .bind(&milestone.description)
    .bind(milestone.category.as_str())
    .bind(milestone.target_month)
    .bind(milestone.min_month)
    .bind(milestone.max_month)
    .bind(&milestone.source)
    .bind(milestone.display_order)
    .bind(milestone.active as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a milestone by id
pub async fn get_milestone(pool: &SqlitePool, id: Uuid) -> Result<Option<Milestone>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, category, target_month, min_month, max_month,
               source, display_order, active
        FROM milestones
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|row| milestone_from_row(&row)).transpose()
}

/// List milestones, optionally restricted to one category
///
/// Ordered by display_order then target_month for stable catalog listings.
pub async fn list_milestones(
    pool: &SqlitePool,
    category: Option<Category>,
    active_only: bool,
) -> Result<Vec<Milestone>> {
    let mut sql = String::from(
        "SELECT id, title, description, category, target_month, min_month, max_month, \
                source, display_order, active \
         FROM milestones WHERE 1=1",
    );
    if category.is_some() {
        sql.push_str(" AND category = ?");
    }
    if active_only {
        sql.push_str(" AND active = 1");
    }
    sql.push_str(" ORDER BY display_order, target_month, title");

    let mut query = sqlx::query(&sql);
    if let Some(category) = category {
        query = query.bind(category.as_str());
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(milestone_from_row).collect()
}

/// Deactivate a milestone (catalog entries are never deleted)
pub async fn deactivate_milestone(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE milestones SET active = 0, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Milestone not found: {}", id)));
    }

    tracing::info!(milestone_id = %id, "Milestone deactivated");

    Ok(())
}

/// Per-category counts of active milestones
pub async fn count_active_by_category(
    pool: &SqlitePool,
    category: Category,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM milestones WHERE category = ? AND active = 1",
    )
    .bind(category.as_str())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Total milestone count (active and inactive)
pub async fn count_milestones(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM milestones")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

fn milestone_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Milestone> {
    let id_str: String = row.get("id");
    let category_str: String = row.get("category");
    let active: i64 = row.get("active");

    Ok(Milestone {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?,
        title: row.get("title"),
        description: row.get("description"),
        category: Category::parse(&category_str)?,
        target_month: row.get("target_month"),
        min_month: row.get("min_month"),
        max_month: row.get("max_month"),
        source: row.get("source"),
        display_order: row.get("display_order"),
        active: active != 0,
    })
}
