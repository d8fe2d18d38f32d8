//! Curation workflow: verify/reject state machine over mappings
//!
//! Two states per mapping: PENDING (initial) and VERIFIED (terminal,
//! reached only by curator approval). Rejection is not a stored state;
//! it deletes the row outright. The underlying candidate score survives
//! deletion, so the pair becomes auto-linkable again on the next run
//! (rejection undoes the decision, it does not blacklist the pair).

use crate::models::{ContentKind, ContentRef, LinkAnchor, Mapping};
use cradle_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Manually create a pending mapping
///
/// Idempotent: when an identical link already exists (any state), the
/// existing row is returned instead of erroring. The referenced milestone
/// and content unit must exist, and the content reference kind must match
/// the unit's kind.
pub async fn create_mapping(
    pool: &SqlitePool,
    anchor: LinkAnchor,
    content: ContentRef,
) -> Result<Mapping> {
    if let LinkAnchor::Milestone(milestone_id) = anchor {
        if crate::db::milestones::get_milestone(pool, milestone_id).await?.is_none() {
            return Err(Error::NotFound(format!("Milestone not found: {}", milestone_id)));
        }
    }

    let unit = crate::db::content_units::get_content_unit(pool, content.unit_id())
        .await?
        .ok_or_else(|| Error::NotFound(format!("Content unit not found: {}", content.unit_id())))?;

    let expected = match unit.kind {
        ContentKind::Quiz => ContentRef::Quiz(unit.id),
        ContentKind::Topic => ContentRef::Topic(unit.id),
    };
    if content != expected {
        return Err(Error::InvalidInput(format!(
            "Content unit {} is a {}, reference kind does not match",
            unit.id,
            unit.kind.as_str()
        )));
    }

    if let Some(existing) = crate::db::mappings::find_for_link(pool, anchor, unit.id).await? {
        tracing::debug!(mapping_id = %existing.id, "Mapping already exists, returning existing row");
        return Ok(existing);
    }

    let mapping = Mapping::manual(anchor, content, unit.lineage);
    crate::db::mappings::insert_mapping(pool, &mapping).await?;

    tracing::info!(mapping_id = %mapping.id, "Manual mapping created");

    Ok(mapping)
}

/// Curator approval: PENDING -> VERIFIED (terminal)
///
/// NotFound when the id does not exist. Calling twice is safe: the second
/// call re-confirms and preserves the original verification record.
pub async fn verify_mapping(
    pool: &SqlitePool,
    id: Uuid,
    curator: &str,
    notes: Option<String>,
) -> Result<Mapping> {
    let mut mapping = crate::db::mappings::get_mapping(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Mapping not found: {}", id)))?;

    let already_verified = mapping.is_verified();
    mapping.verify(curator, notes);
    crate::db::mappings::save_verification(pool, &mapping).await?;

    if already_verified {
        tracing::debug!(mapping_id = %id, "Mapping already verified, re-confirmed");
    } else {
        tracing::info!(mapping_id = %id, curator = %curator, "Mapping verified");
    }

    Ok(mapping)
}

/// Curator rejection: deletes the mapping row
///
/// Works on PENDING and VERIFIED mappings alike; NotFound when absent.
/// Does not cascade to candidate_scores.
pub async fn delete_mapping(pool: &SqlitePool, id: Uuid) -> Result<()> {
    crate::db::mappings::delete_mapping(pool, id).await?;
    tracing::info!(mapping_id = %id, "Mapping deleted");
    Ok(())
}

/// Outcome of one id within a batch approval
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub id: Uuid,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Apply `verify_mapping` to a set of ids
///
/// Per-id commits with no cross-id transaction: a failure on one id never
/// prevents processing the rest.
pub async fn verify_batch(
    pool: &SqlitePool,
    ids: &[Uuid],
    curator: &str,
    notes: Option<String>,
) -> Vec<BatchOutcome> {
    let mut outcomes = Vec::with_capacity(ids.len());

    for &id in ids {
        match verify_mapping(pool, id, curator, notes.clone()).await {
            Ok(_) => outcomes.push(BatchOutcome {
                id,
                verified: true,
                error: None,
            }),
            Err(e) => {
                tracing::warn!(mapping_id = %id, error = %e, "Batch verify: id failed");
                outcomes.push(BatchOutcome {
                    id,
                    verified: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Category, Classification, ContentUnit, Milestone, MilestoneSeed, SourceType,
    };

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    async fn seed_milestone(pool: &SqlitePool) -> Milestone {
        let milestone = Milestone::from_seed(MilestoneSeed {
            title: format!("Milestone {}", Uuid::new_v4()),
            description: "d".to_string(),
            category: Category::Social,
            target_month: 9,
            min_month: None,
            max_month: None,
            source: None,
            display_order: 0,
        });
        crate::db::milestones::upsert_milestone(pool, &milestone).await.unwrap();
        milestone
    }

    async fn seed_unit(pool: &SqlitePool, kind: ContentKind) -> ContentUnit {
        let unit = ContentUnit {
            id: Uuid::new_v4(),
            kind,
            domain: "child_development".to_string(),
            sub_domain: None,
            week: 30,
            text: format!("content {}", Uuid::new_v4()),
            content_hash: Uuid::new_v4().to_string(),
            developmental_tag: None,
            classification: Classification::Manual,
            lineage: SourceType::V2,
            active: true,
        };
        crate::db::content_units::insert_content_unit(pool, &unit).await.unwrap();
        unit
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let pool = setup_test_db().await;
        let milestone = seed_milestone(&pool).await;
        let unit = seed_unit(&pool, ContentKind::Quiz).await;
        let anchor = LinkAnchor::Milestone(milestone.id);

        let first = create_mapping(&pool, anchor, ContentRef::Quiz(unit.id)).await.unwrap();
        let second = create_mapping(&pool, anchor, ContentRef::Quiz(unit.id)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(crate::db::mappings::count_total(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_kind_mismatch() {
        let pool = setup_test_db().await;
        let milestone = seed_milestone(&pool).await;
        let unit = seed_unit(&pool, ContentKind::Topic).await;

        let result = create_mapping(
            &pool,
            LinkAnchor::Milestone(milestone.id),
            ContentRef::Quiz(unit.id),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_references() {
        let pool = setup_test_db().await;
        let unit = seed_unit(&pool, ContentKind::Quiz).await;

        // Unknown milestone
        let result = create_mapping(
            &pool,
            LinkAnchor::Milestone(Uuid::new_v4()),
            ContentRef::Quiz(unit.id),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        // Unknown content unit
        let milestone = seed_milestone(&pool).await;
        let result = create_mapping(
            &pool,
            LinkAnchor::Milestone(milestone.id),
            ContentRef::Quiz(Uuid::new_v4()),
        )
        .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_sets_attribution_and_is_reentrant() {
        let pool = setup_test_db().await;
        let milestone = seed_milestone(&pool).await;
        let unit = seed_unit(&pool, ContentKind::Quiz).await;

        let mapping = create_mapping(
            &pool,
            LinkAnchor::Milestone(milestone.id),
            ContentRef::Quiz(unit.id),
        )
        .await
        .unwrap();

        let verified = verify_mapping(&pool, mapping.id, "curator-1", Some("ok".to_string()))
            .await
            .unwrap();
        let record = verified.verification.clone().unwrap();
        assert_eq!(record.verified_by, "curator-1");

        // Second call does not error and keeps the original record
        let reconfirmed = verify_mapping(&pool, mapping.id, "curator-2", None).await.unwrap();
        let record2 = reconfirmed.verification.unwrap();
        assert_eq!(record2.verified_by, "curator-1");
        assert_eq!(record2.verified_at, record.verified_at);
    }

    #[tokio::test]
    async fn test_verify_missing_is_not_found() {
        let pool = setup_test_db().await;
        let result = verify_mapping(&pool, Uuid::new_v4(), "curator-1", None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_batch_failure_does_not_abort_rest() {
        let pool = setup_test_db().await;
        let milestone = seed_milestone(&pool).await;
        let unit_a = seed_unit(&pool, ContentKind::Quiz).await;
        let unit_b = seed_unit(&pool, ContentKind::Quiz).await;
        let anchor = LinkAnchor::Milestone(milestone.id);

        let a = create_mapping(&pool, anchor, ContentRef::Quiz(unit_a.id)).await.unwrap();
        let b = create_mapping(&pool, anchor, ContentRef::Quiz(unit_b.id)).await.unwrap();
        let missing = Uuid::new_v4();

        let outcomes = verify_batch(&pool, &[a.id, missing, b.id], "curator-1", None).await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].verified);
        assert!(!outcomes[1].verified);
        assert!(outcomes[1].error.is_some());
        assert!(outcomes[2].verified);

        assert_eq!(crate::db::mappings::count_verified(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_preserves_candidate_score() {
        let pool = setup_test_db().await;
        let milestone = seed_milestone(&pool).await;
        let unit = seed_unit(&pool, ContentKind::Quiz).await;

        let score = crate::models::CandidateScore::new(milestone.id, unit.id, 5, "s".to_string())
            .unwrap();
        crate::db::scores::upsert_score(&pool, &score).await.unwrap();

        let mapping = create_mapping(
            &pool,
            LinkAnchor::Milestone(milestone.id),
            ContentRef::Quiz(unit.id),
        )
        .await
        .unwrap();

        delete_mapping(&pool, mapping.id).await.unwrap();

        // Score survives; the pair is auto-linkable again
        assert!(crate::db::scores::get_score(&pool, milestone.id, unit.id)
            .await
            .unwrap()
            .is_some());
    }
}
