//! Candidate score: cached AI relevance rating for a (milestone, content
//! unit) pair
//!
//! Upserted keyed by the pair (store-level unique constraint); re-scoring
//! is last-write-wins. A score of 0 is a valid persisted outcome meaning
//! "not relevant" and acts as a negative cache.

use chrono::{DateTime, Utc};
use cradle_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// AI-assessed relevance rating for a (milestone, content unit) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub milestone_id: Uuid,
    pub content_unit_id: Uuid,
    /// Integer relevance in [0, 5]
    pub relevance_score: i64,
    pub reasoning: String,
    pub scored_at: DateTime<Utc>,
}

impl CandidateScore {
    pub fn new(
        milestone_id: Uuid,
        content_unit_id: Uuid,
        relevance_score: i64,
        reasoning: String,
    ) -> Result<Self> {
        validate_relevance(relevance_score)?;
        Ok(Self {
            milestone_id,
            content_unit_id,
            relevance_score,
            reasoning,
            scored_at: Utc::now(),
        })
    }
}

/// Validate a relevance score is within [0, 5]
pub fn validate_relevance(score: i64) -> Result<()> {
    if (0..=5).contains(&score) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Relevance score out of range [0,5]: {}",
            score
        )))
    }
}
