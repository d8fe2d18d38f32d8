//! Content admission with duplicate rejection
//!
//! Normalizes the unit's text (trim, case-fold, collapse whitespace),
//! computes a SHA-256 hash over the result, and rejects the unit when an
//! active unit with the same hash already exists in the same domain.
//! No external calls; the only side effect is the store write on success.

use crate::models::{ContentUnit, NewContentUnit};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

/// Dedup guard errors
#[derive(Debug, Error)]
pub enum DedupError {
    /// Normalized text collides with an existing active unit in the domain
    #[error("Duplicate content in domain '{domain}': matches unit {existing_id}")]
    DuplicateContent { domain: String, existing_id: Uuid },

    /// Empty text after normalization
    #[error("Content text is empty after normalization")]
    EmptyContent,

    /// Store failure
    #[error("Database error: {0}")]
    Database(#[from] cradle_common::Error),
}

/// Normalize text and compute its stable content hash
///
/// Normalization: trim, Unicode-lowercase, collapse internal whitespace
/// runs to single spaces. The hash is hex-encoded SHA-256 over the
/// normalized form.
pub fn normalized_content_hash(text: &str) -> String {
    let normalized = text
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    format!("{:x}", Sha256::digest(normalized.as_bytes()))
}

/// Admit a content unit, rejecting duplicates
///
/// The hash is computed once here and never changes for the unit's
/// lifetime. On collision nothing is persisted.
pub async fn admit_content_unit(
    pool: &SqlitePool,
    new_unit: NewContentUnit,
) -> Result<ContentUnit, DedupError> {
    if new_unit.text.trim().is_empty() {
        return Err(DedupError::EmptyContent);
    }

    let content_hash = normalized_content_hash(&new_unit.text);

    if let Some(existing_id) =
        crate::db::content_units::find_active_by_hash(pool, &new_unit.domain, &content_hash).await?
    {
        tracing::info!(
            domain = %new_unit.domain,
            existing_id = %existing_id,
            "Duplicate content rejected"
        );
        return Err(DedupError::DuplicateContent {
            domain: new_unit.domain,
            existing_id,
        });
    }

    let unit = ContentUnit {
        id: Uuid::new_v4(),
        kind: new_unit.kind,
        domain: new_unit.domain,
        sub_domain: new_unit.sub_domain,
        week: new_unit.week,
        text: new_unit.text,
        content_hash,
        developmental_tag: new_unit.developmental_tag,
        classification: new_unit.classification,
        lineage: new_unit.lineage,
        active: true,
    };

    crate::db::content_units::insert_content_unit(pool, &unit).await?;

    tracing::debug!(unit_id = %unit.id, domain = %unit.domain, "Content unit admitted");

    Ok(unit)
}
