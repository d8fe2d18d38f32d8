//! Curation engine services

pub mod auto_linker;
pub mod candidate_scorer;
pub mod classifier_client;
pub mod coverage;
pub mod curation;
pub mod dedup_guard;

pub use auto_linker::{auto_link, LinkRunSummary};
pub use candidate_scorer::{CandidateScorer, ScoreRunSummary};
pub use classifier_client::{Classify, ClassifierClient, ClassifierError, ClassifyRequest, RelevanceRating};
pub use coverage::{
    get_category_coverage, get_curation_stats, get_curation_view, get_domain_distribution,
    AgeRangeGroup, CategoryCoverage, CurationStats, DomainDistribution,
};
pub use curation::{create_mapping, delete_mapping, verify_batch, verify_mapping, BatchOutcome};
pub use dedup_guard::{admit_content_unit, normalized_content_hash, DedupError};
