//! Mapping types: weighted, curator-auditable links between a milestone
//! (or maternal domain) and a content unit
//!
//! Lifecycle: born PENDING (auto-generated or manual), reaches VERIFIED
//! only via explicit curator approval (terminal), deleted on rejection.
//! There is no unverify transition.

use chrono::{DateTime, Utc};
use cradle_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed maternal-health domain keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaternalDomain {
    Nutrition,
    PhysicalChanges,
    EmotionalWellbeing,
    WarningSigns,
    BirthPreparation,
    NewbornCare,
}

impl MaternalDomain {
    pub const ALL: [MaternalDomain; 6] = [
        MaternalDomain::Nutrition,
        MaternalDomain::PhysicalChanges,
        MaternalDomain::EmotionalWellbeing,
        MaternalDomain::WarningSigns,
        MaternalDomain::BirthPreparation,
        MaternalDomain::NewbornCare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaternalDomain::Nutrition => "nutrition",
            MaternalDomain::PhysicalChanges => "physical_changes",
            MaternalDomain::EmotionalWellbeing => "emotional_wellbeing",
            MaternalDomain::WarningSigns => "warning_signs",
            MaternalDomain::BirthPreparation => "birth_preparation",
            MaternalDomain::NewbornCare => "newborn_care",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "nutrition" => Ok(MaternalDomain::Nutrition),
            "physical_changes" => Ok(MaternalDomain::PhysicalChanges),
            "emotional_wellbeing" => Ok(MaternalDomain::EmotionalWellbeing),
            "warning_signs" => Ok(MaternalDomain::WarningSigns),
            "birth_preparation" => Ok(MaternalDomain::BirthPreparation),
            "newborn_care" => Ok(MaternalDomain::NewbornCare),
            other => Err(Error::InvalidInput(format!("Unknown maternal domain: {}", other))),
        }
    }
}

/// Reference to exactly one content unit, tagged by kind
///
/// Modeled as a tagged union rather than two optional foreign keys, so the
/// both-or-neither invalid state cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRef {
    Quiz(Uuid),
    Topic(Uuid),
}

impl ContentRef {
    /// The referenced content unit id, regardless of kind
    pub fn unit_id(&self) -> Uuid {
        match self {
            ContentRef::Quiz(id) | ContentRef::Topic(id) => *id,
        }
    }

    pub fn quiz_id(&self) -> Option<Uuid> {
        match self {
            ContentRef::Quiz(id) => Some(*id),
            ContentRef::Topic(_) => None,
        }
    }

    pub fn topic_id(&self) -> Option<Uuid> {
        match self {
            ContentRef::Topic(id) => Some(*id),
            ContentRef::Quiz(_) => None,
        }
    }

    /// Decode from paired nullable database columns, enforcing the
    /// exactly-one-of invariant
    pub fn from_columns(quiz_id: Option<Uuid>, topic_id: Option<Uuid>) -> Result<Self> {
        match (quiz_id, topic_id) {
            (Some(id), None) => Ok(ContentRef::Quiz(id)),
            (None, Some(id)) => Ok(ContentRef::Topic(id)),
            (Some(_), Some(_)) => Err(Error::InvalidInput(
                "Mapping references both a quiz and a topic".to_string(),
            )),
            (None, None) => Err(Error::InvalidInput(
                "Mapping references neither a quiz nor a topic".to_string(),
            )),
        }
    }
}

/// What a mapping is anchored on: a catalog milestone (child journeys) or
/// a fixed domain key (maternal journeys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAnchor {
    Milestone(Uuid),
    Domain(MaternalDomain),
}

impl LinkAnchor {
    pub fn milestone_id(&self) -> Option<Uuid> {
        match self {
            LinkAnchor::Milestone(id) => Some(*id),
            LinkAnchor::Domain(_) => None,
        }
    }

    pub fn domain(&self) -> Option<MaternalDomain> {
        match self {
            LinkAnchor::Domain(domain) => Some(*domain),
            LinkAnchor::Milestone(_) => None,
        }
    }

    /// Decode from paired nullable database columns
    pub fn from_columns(milestone_id: Option<Uuid>, domain: Option<&str>) -> Result<Self> {
        match (milestone_id, domain) {
            (Some(id), None) => Ok(LinkAnchor::Milestone(id)),
            (None, Some(domain)) => Ok(LinkAnchor::Domain(MaternalDomain::parse(domain)?)),
            (Some(_), Some(_)) => Err(Error::InvalidInput(
                "Mapping anchored on both a milestone and a domain".to_string(),
            )),
            (None, None) => Err(Error::InvalidInput(
                "Mapping anchored on neither a milestone nor a domain".to_string(),
            )),
        }
    }
}

/// Content lineage of the mapped unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Legacy,
    #[default]
    V2,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Legacy => "legacy",
            SourceType::V2 => "v2",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "legacy" => Ok(SourceType::Legacy),
            "v2" => Ok(SourceType::V2),
            other => Err(Error::InvalidInput(format!("Unknown source type: {}", other))),
        }
    }
}

/// Curator verification record; both fields set together or absent together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub verified_at: DateTime<Utc>,
    pub verified_by: String,
}

/// Weighted link between an anchor and a content unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapping {
    pub id: Uuid,
    pub anchor: LinkAnchor,
    pub content: ContentRef,
    /// Relevance weight in [0.0, 1.0]
    pub weight: f64,
    pub is_auto_generated: bool,
    /// Present iff the mapping is VERIFIED
    pub verification: Option<Verification>,
    pub notes: Option<String>,
    pub source_type: SourceType,
    pub created_at: DateTime<Utc>,
}

impl Mapping {
    /// Create a pending manual mapping with full weight
    pub fn manual(anchor: LinkAnchor, content: ContentRef, source_type: SourceType) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchor,
            content,
            weight: 1.0,
            is_auto_generated: false,
            verification: None,
            notes: None,
            source_type,
            created_at: Utc::now(),
        }
    }

    /// Create a pending auto-generated mapping from a relevance score (0-5)
    pub fn auto_generated(
        anchor: LinkAnchor,
        content: ContentRef,
        relevance_score: i64,
        source_type: SourceType,
    ) -> Result<Self> {
        if !(0..=5).contains(&relevance_score) {
            return Err(Error::InvalidInput(format!(
                "Relevance score out of range: {}",
                relevance_score
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            anchor,
            content,
            weight: relevance_score as f64 / 5.0,
            is_auto_generated: true,
            verification: None,
            notes: None,
            source_type,
            created_at: Utc::now(),
        })
    }

    pub fn is_verified(&self) -> bool {
        self.verification.is_some()
    }

    /// Apply curator approval
    ///
    /// VERIFIED is terminal: a second call re-confirms without touching the
    /// original verification timestamp.
    pub fn verify(&mut self, curator: &str, notes: Option<String>) {
        if self.verification.is_none() {
            self.verification = Some(Verification {
                verified_at: Utc::now(),
                verified_by: curator.to_string(),
            });
        }
        if notes.is_some() {
            self.notes = notes;
        }
    }
}
