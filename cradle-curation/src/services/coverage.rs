//! Coverage aggregator: read-only rollups over mappings and the catalog
//!
//! Everything here is computed on demand; nothing is materialized. The
//! numbers tolerate staleness between the last mapping write and the read.

use crate::models::{CandidateScore, Category, Mapping, MaternalDomain, Milestone};
use cradle_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Minimum relevance score for a pair to appear as a candidate in the
/// curation view
pub const CANDIDATE_VISIBILITY_FLOOR: i64 = 3;

/// Fixed, non-overlapping age-range buckets (months, inclusive)
pub const AGE_BUCKETS: [(i64, i64); 6] = [(0, 3), (4, 6), (7, 12), (13, 24), (25, 36), (37, 60)];

/// Per-category verified coverage
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCoverage {
    pub category: Category,
    pub total_milestones: i64,
    pub verified_milestones: i64,
    /// Integer percentage; 0 for categories with no active milestones
    pub coverage_pct: i64,
}

/// Coverage percentage for each of the six developmental categories
///
/// coverage = distinct active milestones with >= 1 verified mapping /
/// active milestones in the category, rounded to an integer. A category
/// with zero active milestones reports 0, never a division error.
pub async fn get_category_coverage(pool: &SqlitePool) -> Result<Vec<CategoryCoverage>> {
    let mut coverage = Vec::with_capacity(Category::ALL.len());

    for category in Category::ALL {
        let total = crate::db::milestones::count_active_by_category(pool, category).await?;
        let verified = crate::db::mappings::count_verified_milestones(pool, category).await?;
        coverage.push(CategoryCoverage {
            category,
            total_milestones: total,
            verified_milestones: verified,
            coverage_pct: rounded_pct(verified, total),
        });
    }

    Ok(coverage)
}

/// Per-domain content unit counts (maternal variant)
///
/// No milestone concept applies here; the domain itself is the unit of
/// coverage.
#[derive(Debug, Clone, Serialize)]
pub struct DomainDistribution {
    pub domain: MaternalDomain,
    pub content_units: i64,
}

/// Content unit counts for each of the six fixed maternal domains
pub async fn get_domain_distribution(pool: &SqlitePool) -> Result<Vec<DomainDistribution>> {
    let mut distribution = Vec::with_capacity(MaternalDomain::ALL.len());

    for domain in MaternalDomain::ALL {
        let content_units =
            crate::db::content_units::count_by_domain(pool, domain.as_str()).await?;
        distribution.push(DomainDistribution {
            domain,
            content_units,
        });
    }

    Ok(distribution)
}

/// Summary statistics over the mapping store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurationStats {
    pub total_milestones: i64,
    pub total_mappings: i64,
    pub auto_generated: i64,
    pub verified: i64,
    pub pending_review: i64,
    /// Integer percentage; 0 when there are no mappings
    pub verification_rate: i64,
}

pub async fn get_curation_stats(pool: &SqlitePool) -> Result<CurationStats> {
    let total_milestones = crate::db::milestones::count_milestones(pool).await?;
    let total_mappings = crate::db::mappings::count_total(pool).await?;
    let auto_generated = crate::db::mappings::count_auto_generated(pool).await?;
    let verified = crate::db::mappings::count_verified(pool).await?;

    Ok(CurationStats {
        total_milestones,
        total_mappings,
        auto_generated,
        verified,
        pending_review: total_mappings - verified,
        verification_rate: rounded_pct(verified, total_mappings),
    })
}

/// A content unit already linked to a milestone (any verification state)
#[derive(Debug, Clone, Serialize)]
pub struct LinkedContent {
    pub mapping_id: Uuid,
    pub content_unit_id: Uuid,
    pub weight: f64,
    pub verified: bool,
}

/// A scored-but-unlinked content unit proposed for curation
#[derive(Debug, Clone, Serialize)]
pub struct CandidateContent {
    pub content_unit_id: Uuid,
    pub relevance_score: i64,
    pub reasoning: String,
}

/// One milestone's curation state within an age bucket
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneCurationEntry {
    pub milestone: Milestone,
    /// Existing mappings, pending or verified
    pub linked: Vec<LinkedContent>,
    /// Scores above the visibility floor with no mapping yet; disjoint
    /// from `linked`
    pub candidates: Vec<CandidateContent>,
}

/// Milestones grouped into a fixed age-range bucket
#[derive(Debug, Clone, Serialize)]
pub struct AgeRangeGroup {
    pub label: String,
    pub min_month: i64,
    pub max_month: i64,
    pub milestones: Vec<MilestoneCurationEntry>,
}

/// Curation timeline view
///
/// Milestones are bucketed by target age. The optional category filter
/// narrows the milestone entries; bucket membership (the fixed age ranges)
/// never changes.
pub async fn get_curation_view(
    pool: &SqlitePool,
    category: Option<Category>,
) -> Result<Vec<AgeRangeGroup>> {
    let milestones = crate::db::milestones::list_milestones(pool, category, true).await?;

    let mut groups: Vec<AgeRangeGroup> = AGE_BUCKETS
        .iter()
        .map(|&(min_month, max_month)| AgeRangeGroup {
            label: format!("{}-{} months", min_month, max_month),
            min_month,
            max_month,
            milestones: Vec::new(),
        })
        .collect();

    for milestone in milestones {
        let Some(group) = groups
            .iter_mut()
            .find(|g| milestone.target_month >= g.min_month && milestone.target_month <= g.max_month)
        else {
            // Outside every bucket (beyond the timeline horizon)
            continue;
        };

        let mappings = crate::db::mappings::list_for_milestone(pool, milestone.id).await?;
        let scores = crate::db::scores::list_for_milestone(
            pool,
            milestone.id,
            CANDIDATE_VISIBILITY_FLOOR,
        )
        .await?;

        group
            .milestones
            .push(build_entry(milestone, mappings, scores));
    }

    Ok(groups)
}

fn build_entry(
    milestone: Milestone,
    mappings: Vec<Mapping>,
    scores: Vec<CandidateScore>,
) -> MilestoneCurationEntry {
    let linked: Vec<LinkedContent> = mappings
        .iter()
        .map(|m| LinkedContent {
            mapping_id: m.id,
            content_unit_id: m.content.unit_id(),
            weight: m.weight,
            verified: m.is_verified(),
        })
        .collect();

    let candidates = scores
        .into_iter()
        .filter(|s| !linked.iter().any(|l| l.content_unit_id == s.content_unit_id))
        .map(|s| CandidateContent {
            content_unit_id: s.content_unit_id,
            relevance_score: s.relevance_score,
            reasoning: s.reasoning,
        })
        .collect();

    MilestoneCurationEntry {
        milestone,
        linked,
        candidates,
    }
}

fn rounded_pct(part: i64, whole: i64) -> i64 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as i64
    }
}
