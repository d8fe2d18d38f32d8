//! Mapping persistence
//!
//! The anchor (milestone_id XOR domain) and the content reference
//! (quiz_id XOR topic_id) are stored as paired nullable columns and decoded
//! into tagged unions at the boundary, so exactly-one-of violations are
//! rejected on read and cannot be written through the model layer.

use crate::models::{Category, ContentRef, LinkAnchor, Mapping, SourceType, Verification};
use chrono::{DateTime, Utc};
use cradle_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a mapping row
pub async fn insert_mapping(pool: &SqlitePool, mapping: &Mapping) -> Result<()> {
    if !(0.0..=1.0).contains(&mapping.weight) {
        return Err(Error::InvalidInput(format!(
            "Mapping weight out of range: {}",
            mapping.weight
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO mappings (
            id, milestone_id, domain, quiz_id, topic_id, weight,
            is_auto_generated, verified_by_curator, verified_at, verified_by,
            notes, source_type, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(mapping.id.to_string())
    .bind(mapping.anchor.milestone_id().map(|id| id.to_string()))
    .bind(mapping.anchor.domain().map(|d| d.as_str()))
    .bind(mapping.content.quiz_id().map(|id| id.to_string()))
    .bind(mapping.content.topic_id().map(|id| id.to_string()))
    .bind(mapping.weight)
    .bind(mapping.is_auto_generated as i64)
    .bind(mapping.is_verified() as i64)
    .bind(mapping.verification.as_ref().map(|v| v.verified_at.to_rfc3339()))
    .bind(mapping.verification.as_ref().map(|v| v.verified_by.clone()))
    .bind(&mapping.notes)
    .bind(mapping.source_type.as_str())
    .bind(mapping.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a mapping by id
pub async fn get_mapping(pool: &SqlitePool, id: Uuid) -> Result<Option<Mapping>> {
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_MAPPINGS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(|row| mapping_from_row(&row)).transpose()
}

/// Find any existing mapping for an (anchor, content unit) combination
///
/// Auto-generated or manual, pending or verified: any hit counts. This is
/// the auto-linker's duplicate check.
pub async fn find_for_link(
    pool: &SqlitePool,
    anchor: LinkAnchor,
    content_unit_id: Uuid,
) -> Result<Option<Mapping>> {
    let unit_str = content_unit_id.to_string();

    let row = match anchor {
        LinkAnchor::Milestone(milestone_id) => {
            sqlx::query(&format!(
                "{} WHERE milestone_id = ? AND (quiz_id = ? OR topic_id = ?)",
                SELECT_MAPPINGS
            ))
            .bind(milestone_id.to_string())
            .bind(&unit_str)
            .bind(&unit_str)
            .fetch_optional(pool)
            .await?
        }
        LinkAnchor::Domain(domain) => {
            sqlx::query(&format!(
                "{} WHERE domain = ? AND (quiz_id = ? OR topic_id = ?)",
                SELECT_MAPPINGS
            ))
            .bind(domain.as_str())
            .bind(&unit_str)
            .bind(&unit_str)
            .fetch_optional(pool)
            .await?
        }
    };

    row.map(|row| mapping_from_row(&row)).transpose()
}

/// List mappings, optionally filtered by verification state
pub async fn list_mappings(pool: &SqlitePool, verified: Option<bool>) -> Result<Vec<Mapping>> {
    let rows = match verified {
        Some(verified) => {
            sqlx::query(&format!(
                "{} WHERE verified_by_curator = ? ORDER BY created_at",
                SELECT_MAPPINGS
            ))
            .bind(verified as i64)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!("{} ORDER BY created_at", SELECT_MAPPINGS))
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(mapping_from_row).collect()
}

/// List mappings anchored on a milestone
pub async fn list_for_milestone(pool: &SqlitePool, milestone_id: Uuid) -> Result<Vec<Mapping>> {
    let rows = sqlx::query(&format!(
        "{} WHERE milestone_id = ? ORDER BY weight DESC",
        SELECT_MAPPINGS
    ))
    .bind(milestone_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(mapping_from_row).collect()
}

/// Persist a mapping's verification fields
pub async fn save_verification(pool: &SqlitePool, mapping: &Mapping) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE mappings
        SET verified_by_curator = ?, verified_at = ?, verified_by = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(mapping.is_verified() as i64)
    .bind(mapping.verification.as_ref().map(|v| v.verified_at.to_rfc3339()))
    .bind(mapping.verification.as_ref().map(|v| v.verified_by.clone()))
    .bind(&mapping.notes)
    .bind(mapping.id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a mapping row (curator rejection)
///
/// Returns NotFound when the id does not exist. The underlying candidate
/// score is never touched.
pub async fn delete_mapping(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM mappings WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Mapping not found: {}", id)));
    }

    Ok(())
}

/// Total mapping count
pub async fn count_total(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mappings")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Auto-generated mapping count
pub async fn count_auto_generated(pool: &SqlitePool) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM mappings WHERE is_auto_generated = 1")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Verified mapping count
pub async fn count_verified(pool: &SqlitePool) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM mappings WHERE verified_by_curator = 1")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Distinct active milestones in a category with at least one verified
/// mapping
pub async fn count_verified_milestones(pool: &SqlitePool, category: Category) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT m.id)
        FROM milestones m
        JOIN mappings mp ON mp.milestone_id = m.id
        WHERE m.category = ? AND m.active = 1 AND mp.verified_by_curator = 1
        "#,
    )
    .bind(category.as_str())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

const SELECT_MAPPINGS: &str = "SELECT id, milestone_id, domain, quiz_id, topic_id, weight, \
     is_auto_generated, verified_by_curator, verified_at, verified_by, \
     notes, source_type, created_at FROM mappings";

fn mapping_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Mapping> {
    let id_str: String = row.get("id");
    let milestone_str: Option<String> = row.get("milestone_id");
    let domain_str: Option<String> = row.get("domain");
    let quiz_str: Option<String> = row.get("quiz_id");
    let topic_str: Option<String> = row.get("topic_id");
    let verified_flag: i64 = row.get("verified_by_curator");
    let verified_at_str: Option<String> = row.get("verified_at");
    let verified_by: Option<String> = row.get("verified_by");
    let source_type_str: String = row.get("source_type");
    let created_at_str: String = row.get("created_at");

    let parse_uuid = |s: &str| {
        Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
    };

    let milestone_id = milestone_str.as_deref().map(parse_uuid).transpose()?;
    let quiz_id = quiz_str.as_deref().map(parse_uuid).transpose()?;
    let topic_id = topic_str.as_deref().map(parse_uuid).transpose()?;

    let verification = match (verified_flag != 0, verified_at_str, verified_by) {
        (true, Some(at), Some(by)) => Some(Verification {
            verified_at: DateTime::parse_from_rfc3339(&at)
                .map_err(|e| Error::Internal(format!("Invalid timestamp in database: {}", e)))?
                .with_timezone(&Utc),
            verified_by: by,
        }),
        (false, None, None) => None,
        _ => {
            return Err(Error::Internal(format!(
                "Mapping {} has inconsistent verification fields",
                id_str
            )))
        }
    };

    Ok(Mapping {
        id: parse_uuid(&id_str)?,
        anchor: LinkAnchor::from_columns(milestone_id, domain_str.as_deref())?,
        content: ContentRef::from_columns(quiz_id, topic_id)?,
        weight: row.get("weight"),
        is_auto_generated: row.get::<i64, _>("is_auto_generated") != 0,
        verification,
        notes: row.get("notes"),
        source_type: SourceType::parse(&source_type_str)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| Error::Internal(format!("Invalid timestamp in database: {}", e)))?
            .with_timezone(&Utc),
    })
}
