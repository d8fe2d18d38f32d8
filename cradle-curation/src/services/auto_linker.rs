//! Auto-linker: promotes high-confidence candidate scores into mappings
//!
//! Selects every candidate score at or above the caller-supplied threshold
//! and creates a pending auto-generated mapping for each pair that has no
//! existing mapping of any kind. Pairs that already have a mapping
//! (auto or manual, pending or verified) are silently skipped; idempotence
//! takes priority over signaling, so a second run with no intervening
//! writes creates zero mappings.

use crate::models::{ContentKind, ContentRef, LinkAnchor, Mapping};
use cradle_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;

/// Outcome of one auto-link run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkRunSummary {
    /// Mappings created in this run
    pub total_mappings: usize,
    /// Scores at or above the threshold that were examined
    pub considered_pairs: usize,
}

/// Promote scores at or above `threshold` (0-5) into pending mappings
///
/// New mappings carry `weight = relevance_score / 5.0`, are flagged
/// auto-generated and unverified, and copy `source_type` from the content
/// unit's lineage.
pub async fn auto_link(pool: &SqlitePool, threshold: i64) -> Result<LinkRunSummary> {
    if !(0..=5).contains(&threshold) {
        return Err(Error::InvalidInput(format!(
            "Auto-link threshold out of range [0,5]: {}",
            threshold
        )));
    }

    let selected = crate::db::scores::list_at_or_above(pool, threshold).await?;
    let considered_pairs = selected.len();
    let mut total_mappings = 0usize;

    for score in selected {
        let anchor = LinkAnchor::Milestone(score.milestone_id);

        // Any existing mapping for the pair wins; skip without overwriting
        if crate::db::mappings::find_for_link(pool, anchor, score.content_unit_id)
            .await?
            .is_some()
        {
            continue;
        }

        let Some(unit) =
            crate::db::content_units::get_content_unit(pool, score.content_unit_id).await?
        else {
            tracing::warn!(
                content_unit_id = %score.content_unit_id,
                "Candidate score references a missing content unit, skipping"
            );
            continue;
        };

        let content = match unit.kind {
            ContentKind::Quiz => ContentRef::Quiz(unit.id),
            ContentKind::Topic => ContentRef::Topic(unit.id),
        };

        let mapping =
            Mapping::auto_generated(anchor, content, score.relevance_score, unit.lineage)?;
        crate::db::mappings::insert_mapping(pool, &mapping).await?;
        total_mappings += 1;

        tracing::debug!(
            mapping_id = %mapping.id,
            milestone_id = %score.milestone_id,
            content_unit_id = %score.content_unit_id,
            weight = mapping.weight,
            "Auto-generated mapping created"
        );
    }

    tracing::info!(threshold, considered_pairs, total_mappings, "Auto-link run completed");

    Ok(LinkRunSummary {
        total_mappings,
        considered_pairs,
    })
}
