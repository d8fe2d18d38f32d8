//! Candidate scorer: AI relevance rating with caching
//!
//! For every (milestone, content unit) pair not already scored (or all
//! pairs under force_refresh), invokes the classifier and upserts the
//! result keyed by the pair. A 0 score is persisted and acts as a negative
//! cache. Classifier failures leave the pair unscored and tallied in
//! `skipped`; they are retried only on a later invocation. Safe to call
//! repeatedly: once all pairs are scored the run is a no-op.

use crate::models::{CandidateScore, ContentUnit, Milestone};
use crate::services::classifier_client::{Classify, ClassifyRequest};
use cradle_common::Result;
use futures::stream::{self, StreamExt};
use sqlx::SqlitePool;
use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

/// Concurrent classifier calls (bounded to respect external rate limits)
const SCORER_WORKERS: usize = 4;

/// Outcome of one scoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreRunSummary {
    /// Pairs scored and persisted in this run
    pub scored: usize,
    /// Pairs left unscored (cached or failed)
    pub skipped: usize,
}

/// Candidate Scorer
pub struct CandidateScorer {
    db: SqlitePool,
    classifier: Arc<dyn Classify>,
}

impl CandidateScorer {
    pub fn new(db: SqlitePool, classifier: Arc<dyn Classify>) -> Self {
        Self { db, classifier }
    }

    /// Score content units against a milestone
    ///
    /// Pairs already present in candidate_scores are skipped unless
    /// `force_refresh`, which re-scores everything (last-write-wins).
    /// The only writes are candidate_scores upserts.
    pub async fn score_candidates(
        &self,
        milestone: &Milestone,
        content_units: &[ContentUnit],
        force_refresh: bool,
    ) -> Result<ScoreRunSummary> {
        let cached = if force_refresh {
            Default::default()
        } else {
            crate::db::scores::scored_unit_ids(&self.db, milestone.id).await?
        };

        let mut skipped = cached
            .iter()
            .filter(|id| content_units.iter().any(|u| u.id == **id))
            .count();

        let pending: Vec<&ContentUnit> = content_units
            .iter()
            .filter(|unit| !cached.contains(&unit.id))
            .collect();

        tracing::info!(
            milestone_id = %milestone.id,
            pending = pending.len(),
            cached = skipped,
            force_refresh,
            "Scoring run started"
        );

        // Bounded worker pool; pairs are independent, no ordering assumed
        let jobs: Vec<(Uuid, ClassifyRequest)> = pending
            .iter()
            .map(|unit| (unit.id, ClassifyRequest::for_pair(milestone, unit)))
            .collect();
        let results: Vec<(Uuid, std::result::Result<_, _>)> = stream::iter(jobs)
            .map(|(unit_id, request)| {
                let classifier = self.classifier.clone();
                classify_pair(classifier, request, unit_id)
            })
            .buffer_unordered(SCORER_WORKERS)
            .collect()
            .await;

        let mut scored = 0usize;
        for (unit_id, outcome) in results {
            match outcome {
                Ok(rating) => {
                    let score = CandidateScore::new(
                        milestone.id,
                        unit_id,
                        rating.score,
                        rating.reasoning,
                    )?;
                    crate::db::scores::upsert_score(&self.db, &score).await?;
                    scored += 1;
                }
                Err(e) => {
                    // Left unscored; eligible again on the next invocation
                    tracing::warn!(
                        milestone_id = %milestone.id,
                        content_unit_id = %unit_id,
                        error = %e,
                        "Classifier call failed, pair skipped"
                    );
                    skipped += 1;
                }
            }
        }

        tracing::info!(
            milestone_id = %milestone.id,
            scored,
            skipped,
            "Scoring run completed"
        );

        Ok(ScoreRunSummary { scored, skipped })
    }
}

/// Standalone future so the stream closure's return type carries no borrow
/// of the stream item (keeps the handler future higher-ranked-lifetime safe)
async fn classify_pair(
    classifier: Arc<dyn Classify>,
    request: ClassifyRequest,
    unit_id: Uuid,
) -> (
    Uuid,
    std::result::Result<
        crate::services::classifier_client::RelevanceRating,
        crate::services::classifier_client::ClassifierError,
    >,
) {
    let outcome = classifier.classify(&request).await;
    (unit_id, outcome)
}
