//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{DeviceConfig, LoggingConfig, ModelsConfig, RagChatConfig, SessionConfig};

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "Llama-3.2-1B-Instruct-q4f16_1-MLC";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "snowflake-arctic-embed-m-q0f32-MLC-b4";

/// Default sliding history window: last two user/assistant pairs.
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

/// Default number of catalog documents retrieved per prompt.
pub const DEFAULT_TOP_K: usize = 4;

/// Buffer bindings at or below 128 MiB mark a device as restricted.
pub const DEFAULT_MIN_BUFFER_BINDING_BYTES: u64 = 128 * 1024 * 1024;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful shopping assistant for an online store. \
Answer questions about the products using only the catalog context you are given. \
If the context does not contain the answer, say that you do not know.";

pub fn default_restricted_vendors() -> Vec<String> {
    vec!["qualcomm".to_string(), "arm".to_string()]
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: RagChatConfig) -> RagChatConfig {
    let config = apply_model_defaults(config);
    let config = apply_session_defaults(config);
    let config = apply_device_defaults(config);
    apply_logging_defaults(config)
}

fn apply_model_defaults(mut config: RagChatConfig) -> RagChatConfig {
    let models = config.models.get_or_insert_with(ModelsConfig::default);
    models
        .chat_model
        .get_or_insert_with(|| DEFAULT_CHAT_MODEL.to_string());
    models
        .embedding_model
        .get_or_insert_with(|| DEFAULT_EMBEDDING_MODEL.to_string());
    config
}

fn apply_session_defaults(mut config: RagChatConfig) -> RagChatConfig {
    let session = config.session.get_or_insert_with(SessionConfig::default);
    session.history_window.get_or_insert(DEFAULT_HISTORY_WINDOW);
    session.top_k.get_or_insert(DEFAULT_TOP_K);
    session
        .system_prompt
        .get_or_insert_with(|| DEFAULT_SYSTEM_PROMPT.to_string());
    config
}

fn apply_device_defaults(mut config: RagChatConfig) -> RagChatConfig {
    let device = config.device.get_or_insert_with(DeviceConfig::default);
    device
        .restricted_vendors
        .get_or_insert_with(default_restricted_vendors);
    device
        .min_buffer_binding_bytes
        .get_or_insert(DEFAULT_MIN_BUFFER_BINDING_BYTES);
    config
}

fn apply_logging_defaults(mut config: RagChatConfig) -> RagChatConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(RagChatConfig::default());
        assert_eq!(
            cfg.models.as_ref().unwrap().chat_model.as_deref(),
            Some(DEFAULT_CHAT_MODEL)
        );
        assert_eq!(cfg.session.as_ref().unwrap().history_window, Some(4));
        assert_eq!(
            cfg.device.as_ref().unwrap().min_buffer_binding_bytes,
            Some(DEFAULT_MIN_BUFFER_BINDING_BYTES)
        );
        assert_eq!(cfg.logging.as_ref().unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn does_not_override_user_values() {
        let mut cfg = RagChatConfig::default();
        cfg.session = Some(SessionConfig {
            top_k: Some(8),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.top_k(), 8);
        assert_eq!(cfg.history_window(), DEFAULT_HISTORY_WINDOW);
    }
}
