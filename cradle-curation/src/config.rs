//! Configuration resolution for cradle-curation
//!
//! Provides multi-tier classifier configuration with Database → ENV → TOML
//! priority. The database tier is authoritative so the key can be rotated
//! from the settings UI without a restart.

use cradle_common::config::TomlConfig;
use cradle_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Resolve the classifier API key from 3-tier configuration
///
/// **Priority:** Database → ENV → TOML
pub async fn resolve_classifier_api_key(
    db: &SqlitePool,
    toml_config: &TomlConfig,
) -> Result<Option<String>> {
    let mut sources = Vec::new();

    let db_key = crate::db::settings::get_classifier_api_key(db).await?;
    if db_key.as_deref().is_some_and(is_valid_key) {
        sources.push("database");
    }

    let env_key = std::env::var("CRADLE_CLASSIFIER_API_KEY").ok();
    if env_key.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }

    let toml_key = toml_config.classifier_api_key.clone();
    if toml_key.as_deref().is_some_and(is_valid_key) {
        sources.push("TOML");
    }

    // Warn if multiple sources (potential misconfiguration)
    if sources.len() > 1 {
        warn!(
            "Classifier API key found in multiple sources: {}. Using database (highest priority).",
            sources.join(", ")
        );
    }

    for (key, source) in [(db_key, "database"), (env_key, "environment"), (toml_key, "TOML")] {
        if let Some(key) = key {
            if is_valid_key(&key) {
                info!("Classifier API key loaded from {}", source);
                return Ok(Some(key));
            }
        }
    }

    // The classifier may be deployed keyless inside a trusted network
    Ok(None)
}

/// Resolve the classifier base URL (ENV → TOML)
pub fn resolve_classifier_base_url(toml_config: &TomlConfig) -> Result<String> {
    if let Ok(url) = std::env::var("CRADLE_CLASSIFIER_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }

    if let Some(url) = &toml_config.classifier_base_url {
        if !url.trim().is_empty() {
            return Ok(url.clone());
        }
    }

    Err(Error::Config(
        "Classifier endpoint not configured. Please configure using one of:\n\
         1. Environment: CRADLE_CLASSIFIER_URL=https://...\n\
         2. TOML config: ~/.config/cradle/curation.toml (classifier_base_url = \"https://...\")"
            .to_string(),
    ))
}

/// Validate an API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
