//! Config validation with user-friendly error messages.

use crate::schema::RagChatConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &RagChatConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_models(config, &mut report);
    validate_session(config, &mut report);
    validate_device(config, &mut report);
    report
}

fn validate_models(config: &RagChatConfig, report: &mut ValidationReport) {
    if config.chat_model().trim().is_empty() {
        report.error("models.chatModel", "Chat model id cannot be empty");
    }
    if config.embedding_model().trim().is_empty() {
        report.error("models.embeddingModel", "Embedding model id cannot be empty");
    }
}

fn validate_session(config: &RagChatConfig, report: &mut ValidationReport) {
    let window = config.history_window();
    if window < 2 || window % 2 != 0 {
        report.error(
            "session.historyWindow",
            format!("historyWindow must be an even number >= 2 (whole user/assistant pairs), got {window}"),
        );
    }
    if config.top_k() == 0 {
        report.error("session.topK", "topK must be >= 1");
    }
    if let Some(t) = config.temperature() {
        if !(0.0..=2.0).contains(&t) {
            report.warn("session.temperature", format!("temperature {t} is outside [0, 2]"));
        }
    }
}

fn validate_device(config: &RagChatConfig, report: &mut ValidationReport) {
    if config.min_buffer_binding_bytes() == 0 {
        report.error("device.minBufferBindingBytes", "minBufferBindingBytes must be > 0");
    }
    if config.restricted_vendors().is_empty() {
        report.warn(
            "device.restrictedVendors",
            "No restricted vendors configured; only buffer size will flag limited devices",
        );
    }
}
