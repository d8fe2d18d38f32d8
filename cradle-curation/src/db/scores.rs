//! Candidate score persistence
//!
//! The (milestone_id, content_unit_id) pair carries a store-level unique
//! constraint; upsert is last-write-wins.

use crate::models::{score::validate_relevance, CandidateScore};
use chrono::{DateTime, Utc};
use cradle_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

/// Upsert a score keyed by the (milestone, content unit) pair
pub async fn upsert_score(pool: &SqlitePool, score: &CandidateScore) -> Result<()> {
    validate_relevance(score.relevance_score)?;

    sqlx::query(
        r#"
        INSERT INTO candidate_scores (
            milestone_id, content_unit_id, relevance_score, reasoning, scored_at
        ) VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(milestone_id, content_unit_id) DO UPDATE SET
            relevance_score = excluded.relevance_score,
            reasoning = excluded.reasoning,
            scored_at = excluded.scored_at
        "#,
    )
    .bind(score.milestone_id.to_string())
    .bind(score.content_unit_id.to_string())
    .bind(score.relevance_score)
    .bind(&score.reasoning)
    .bind(score.scored_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the score for a pair, if present
pub async fn get_score(
    pool: &SqlitePool,
    milestone_id: Uuid,
    content_unit_id: Uuid,
) -> Result<Option<CandidateScore>> {
    let row = sqlx::query(
        r#"
        SELECT milestone_id, content_unit_id, relevance_score, reasoning, scored_at
        FROM candidate_scores
        WHERE milestone_id = ? AND content_unit_id = ?
        "#,
    )
    .bind(milestone_id.to_string())
    .bind(content_unit_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|row| score_from_row(&row)).transpose()
}

/// Content unit ids already scored against a milestone
///
/// Used by the scorer to skip cached pairs (including 0 scores, which act
/// as a negative cache).
pub async fn scored_unit_ids(pool: &SqlitePool, milestone_id: Uuid) -> Result<HashSet<Uuid>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT content_unit_id FROM candidate_scores WHERE milestone_id = ?")
            .bind(milestone_id.to_string())
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(id,)| {
            Uuid::parse_str(&id)
                .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
        })
        .collect()
}

/// All scores at or above a threshold
pub async fn list_at_or_above(pool: &SqlitePool, threshold: i64) -> Result<Vec<CandidateScore>> {
    let rows = sqlx::query(
        r#"
        SELECT milestone_id, content_unit_id, relevance_score, reasoning, scored_at
        FROM candidate_scores
        WHERE relevance_score >= ?
        ORDER BY relevance_score DESC, scored_at
        "#,
    )
    .bind(threshold)
    .fetch_all(pool)
    .await?;

    rows.iter().map(score_from_row).collect()
}

/// Scores for one milestone at or above a visibility floor
pub async fn list_for_milestone(
    pool: &SqlitePool,
    milestone_id: Uuid,
    min_score: i64,
) -> Result<Vec<CandidateScore>> {
    let rows = sqlx::query(
        r#"
        SELECT milestone_id, content_unit_id, relevance_score, reasoning, scored_at
        FROM candidate_scores
        WHERE milestone_id = ? AND relevance_score >= ?
        ORDER BY relevance_score DESC
        "#,
    )
    .bind(milestone_id.to_string())
    .bind(min_score)
    .fetch_all(pool)
    .await?;

    rows.iter().map(score_from_row).collect()
}

fn score_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CandidateScore> {
    let milestone_str: String = row.get("milestone_id");
    let unit_str: String = row.get("content_unit_id");
    let scored_at_str: String = row.get("scored_at");

    Ok(CandidateScore {
        milestone_id: Uuid::parse_str(&milestone_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?,
        content_unit_id: Uuid::parse_str(&unit_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?,
        relevance_score: row.get("relevance_score"),
        reasoning: row.get("reasoning"),
        scored_at: DateTime::parse_from_rfc3339(&scored_at_str)
            .map_err(|e| Error::Internal(format!("Invalid timestamp in database: {}", e)))?
            .with_timezone(&Utc),
    })
}
