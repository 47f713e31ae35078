//! Config file reading.

use crate::schema::RagChatConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<RagChatConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(RagChatConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = from_yaml_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse a config document that was bundled with the page.
pub fn from_yaml_str(yaml: &str) -> Result<RagChatConfig> {
    if yaml.trim().is_empty() {
        return Ok(RagChatConfig::default());
    }
    serde_yaml::from_str(yaml).context("Invalid config YAML")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let cfg = load_config(Path::new("/nonexistent/ragchat/config.yaml"))
            .await
            .unwrap();
        assert_eq!(cfg, RagChatConfig::default());
    }

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(from_yaml_str("  \n").unwrap(), RagChatConfig::default());
    }

    #[test]
    fn invalid_yaml_is_error() {
        assert!(from_yaml_str("session: [unclosed").is_err());
    }
}
