//! ragchat configuration schema.
//!
//! Every field is optional in the file; [`crate::apply_all_defaults`] fills the
//! gaps and the accessor methods on [`RagChatConfig`] return resolved values.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_HISTORY_WINDOW, DEFAULT_LOG_LEVEL,
    DEFAULT_MIN_BUFFER_BINDING_BYTES, DEFAULT_SYSTEM_PROMPT, DEFAULT_TOP_K,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagChatConfig {
    /// Models loaded into the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelsConfig>,

    /// Chat session behaviour
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionConfig>,

    /// Device capability thresholds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Number of turns kept in the sliding chat history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,
    /// Catalog documents retrieved per prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// GPU vendors treated as resource-restricted (matched case-insensitively)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_vendors: Option<Vec<String>>,
    /// Buffer bindings at or below this size mark the device as restricted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_buffer_binding_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling NDJSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved accessors
// ---------------------------------------------------------------------------

impl RagChatConfig {
    pub fn chat_model(&self) -> &str {
        self.models
            .as_ref()
            .and_then(|m| m.chat_model.as_deref())
            .unwrap_or(DEFAULT_CHAT_MODEL)
    }

    pub fn embedding_model(&self) -> &str {
        self.models
            .as_ref()
            .and_then(|m| m.embedding_model.as_deref())
            .unwrap_or(DEFAULT_EMBEDDING_MODEL)
    }

    pub fn history_window(&self) -> usize {
        self.session
            .as_ref()
            .and_then(|s| s.history_window)
            .unwrap_or(DEFAULT_HISTORY_WINDOW)
    }

    pub fn top_k(&self) -> usize {
        self.session.as_ref().and_then(|s| s.top_k).unwrap_or(DEFAULT_TOP_K)
    }

    pub fn system_prompt(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.system_prompt.as_deref())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn temperature(&self) -> Option<f32> {
        self.session.as_ref().and_then(|s| s.temperature)
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.session.as_ref().and_then(|s| s.max_tokens)
    }

    pub fn restricted_vendors(&self) -> Vec<String> {
        self.device
            .as_ref()
            .and_then(|d| d.restricted_vendors.clone())
            .unwrap_or_else(crate::defaults::default_restricted_vendors)
    }

    pub fn min_buffer_binding_bytes(&self) -> u64 {
        self.device
            .as_ref()
            .and_then(|d| d.min_buffer_binding_bytes)
            .unwrap_or(DEFAULT_MIN_BUFFER_BINDING_BYTES)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
models:
  chatModel: Phi-3.5-mini-instruct-q4f16_1-MLC
session:
  historyWindow: 6
  topK: 2
device:
  restrictedVendors: [qualcomm]
  minBufferBindingBytes: 1024
"#;
        let cfg: RagChatConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.chat_model(), "Phi-3.5-mini-instruct-q4f16_1-MLC");
        assert_eq!(cfg.embedding_model(), DEFAULT_EMBEDDING_MODEL);
        assert_eq!(cfg.history_window(), 6);
        assert_eq!(cfg.top_k(), 2);
        assert_eq!(cfg.restricted_vendors(), vec!["qualcomm".to_string()]);
        assert_eq!(cfg.min_buffer_binding_bytes(), 1024);
    }

    #[test]
    fn empty_config_resolves_defaults() {
        let cfg = RagChatConfig::default();
        assert_eq!(cfg.history_window(), 4);
        assert_eq!(cfg.min_buffer_binding_bytes(), 128 * 1024 * 1024);
        assert_eq!(cfg.restricted_vendors(), vec!["qualcomm", "arm"]);
        assert_eq!(cfg.log_level(), "info");
        assert!(cfg.log_dir().is_none());
    }
}
