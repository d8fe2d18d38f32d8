//! Data models for cradle-curation (Milestone/Content Curation engine)

pub mod content_unit;
pub mod mapping;
pub mod milestone;
pub mod score;

pub use content_unit::{Classification, ContentKind, ContentUnit, NewContentUnit};
pub use mapping::{ContentRef, LinkAnchor, Mapping, MaternalDomain, SourceType, Verification};
pub use milestone::{Category, Milestone, MilestoneSeed};
pub use score::CandidateScore;
