//! Milestone catalog types
//!
//! Milestones are static reference data: created by seed import, never
//! deleted, only deactivated.

use cradle_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Developmental category (fixed taxonomy for child milestones)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Motor,
    Cognitive,
    Language,
    Social,
    Emotional,
    Sensory,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 6] = [
        Category::Motor,
        Category::Cognitive,
        Category::Language,
        Category::Social,
        Category::Emotional,
        Category::Sensory,
    ];

    /// Database/API string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Motor => "motor",
            Category::Cognitive => "cognitive",
            Category::Language => "language",
            Category::Social => "social",
            Category::Emotional => "emotional",
            Category::Sensory => "sensory",
        }
    }

    /// Parse from database/API string form
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "motor" => Ok(Category::Motor),
            "cognitive" => Ok(Category::Cognitive),
            "language" => Ok(Category::Language),
            "social" => Ok(Category::Social),
            "emotional" => Ok(Category::Emotional),
            "sensory" => Ok(Category::Sensory),
            other => Err(Error::InvalidInput(format!("Unknown category: {}", other))),
        }
    }
}

/// Official developmental milestone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    /// Expected achievement age in months
    pub target_month: i64,
    /// Lower bound of the typical age window, if narrower than the bucket
    pub min_month: Option<i64>,
    /// Upper bound of the typical age window
    pub max_month: Option<i64>,
    /// Source attribution (e.g. "WHO", "CDC")
    pub source: Option<String>,
    pub display_order: i64,
    pub active: bool,
}

/// Seed-import entry for the milestone catalog
///
/// Upserted keyed by (category, title); an id is assigned on first import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneSeed {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub target_month: i64,
    #[serde(default)]
    pub min_month: Option<i64>,
    #[serde(default)]
    pub max_month: Option<i64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub display_order: i64,
}

impl Milestone {
    /// Instantiate a catalog entry from a seed-import row
    pub fn from_seed(seed: MilestoneSeed) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: seed.title,
            description: seed.description,
            category: seed.category,
            target_month: seed.target_month,
            min_month: seed.min_month,
            max_month: seed.max_month,
            source: seed.source,
            display_order: seed.display_order,
            active: true,
        }
    }
}
