//! Content unit types (journey quiz questions and topics)

use crate::models::{Category, SourceType};
use cradle_common::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of journey content a unit represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Quiz,
    Topic,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Quiz => "quiz",
            ContentKind::Topic => "topic",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "quiz" => Ok(ContentKind::Quiz),
            "topic" => Ok(ContentKind::Topic),
            other => Err(Error::InvalidInput(format!("Unknown content kind: {}", other))),
        }
    }
}

/// Provenance of a unit's developmental-domain assignment
///
/// Confidence exists only for AI classification, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Classification {
    Rule,
    Manual,
    Ai { confidence: f64 },
}

impl Classification {
    pub fn source_str(&self) -> &'static str {
        match self {
            Classification::Rule => "rule",
            Classification::Manual => "manual",
            Classification::Ai { .. } => "ai",
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Classification::Ai { confidence } => Some(*confidence),
            _ => None,
        }
    }

    /// Decode from paired database columns
    pub fn from_columns(source: &str, confidence: Option<f64>) -> Result<Self> {
        match (source, confidence) {
            ("rule", None) => Ok(Classification::Rule),
            ("manual", None) => Ok(Classification::Manual),
            ("ai", Some(confidence)) => {
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(Error::InvalidInput(format!(
                        "Classification confidence out of range: {}",
                        confidence
                    )));
                }
                Ok(Classification::Ai { confidence })
            }
            ("ai", None) => Err(Error::InvalidInput(
                "AI classification requires a confidence value".to_string(),
            )),
            (source, Some(_)) => Err(Error::InvalidInput(format!(
                "Classification source '{}' does not carry a confidence",
                source
            ))),
            (source, None) => Err(Error::InvalidInput(format!(
                "Unknown classification source: {}",
                source
            ))),
        }
    }
}

/// A journey quiz question or topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUnit {
    pub id: Uuid,
    pub kind: ContentKind,
    /// Taxonomy key (e.g. maternal domain or child journey track)
    pub domain: String,
    pub sub_domain: Option<String>,
    /// Week index within the journey
    pub week: i64,
    pub text: String,
    /// SHA-256 over the normalized text; computed once at creation
    pub content_hash: String,
    /// Developmental category tag, when classified
    pub developmental_tag: Option<Category>,
    pub classification: Classification,
    /// Content lineage (legacy vs v2); copied onto auto-generated mappings
    pub lineage: SourceType,
    pub active: bool,
}

/// Content unit submitted for admission (hash not yet computed)
#[derive(Debug, Clone, Deserialize)]
pub struct NewContentUnit {
    pub kind: ContentKind,
    pub domain: String,
    #[serde(default)]
    pub sub_domain: Option<String>,
    pub week: i64,
    pub text: String,
    #[serde(default)]
    pub developmental_tag: Option<Category>,
    pub classification: Classification,
    #[serde(default)]
    pub lineage: SourceType,
}
