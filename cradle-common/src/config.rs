//! Configuration loading and database path resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration file contents
///
/// Lives at `~/.config/cradle/curation.toml` (user) or
/// `/etc/cradle/curation.toml` (system-wide).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// SQLite database file path
    pub database_path: Option<String>,
    /// HTTP bind address (host:port)
    pub bind_address: Option<String>,
    /// AI classifier endpoint base URL
    pub classifier_base_url: Option<String>,
    /// AI classifier API key
    pub classifier_api_key: Option<String>,
}

/// Load TOML config from the platform config directory, if present
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load TOML config, falling back to defaults when no file exists
pub fn load_toml_config_or_default() -> TomlConfig {
    load_toml_config().unwrap_or_default()
}

/// Write TOML config back to disk (creates parent directories)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Resolve the SQLite database path
pub fn resolve_database_path(cli_arg: Option<&str>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("CRADLE_DATABASE") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.database_path {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    default_data_dir().join("curation.db")
}

/// Resolve the HTTP bind address
pub fn resolve_bind_address(toml_config: &TomlConfig) -> String {
    if let Ok(addr) = std::env::var("CRADLE_BIND_ADDRESS") {
        return addr;
    }
    if let Some(addr) = &toml_config.bind_address {
        return addr.clone();
    }
    "127.0.0.1:5731".to_string()
}

/// Get default configuration file path for the platform
pub fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/cradle/curation.toml first, then /etc/cradle/curation.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("cradle").join("curation.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/cradle/curation.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("cradle").join("curation.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cradle"))
        .unwrap_or_else(|| PathBuf::from("./cradle_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_wins() {
        let toml = TomlConfig {
            database_path: Some("/from/toml.db".to_string()),
            ..Default::default()
        };
        let path = resolve_database_path(Some("/from/cli.db"), &toml);
        assert_eq!(path, PathBuf::from("/from/cli.db"));
    }

    #[test]
    fn test_toml_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curation.toml");

        let config = TomlConfig {
            database_path: Some("/data/curation.db".to_string()),
            bind_address: Some("127.0.0.1:5731".to_string()),
            classifier_base_url: Some("https://classifier.example.com".to_string()),
            classifier_api_key: None,
        };

        write_toml_config(&config, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: TomlConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.database_path.as_deref(), Some("/data/curation.db"));
        assert_eq!(parsed.classifier_api_key, None);
    }
}
