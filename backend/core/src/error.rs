use thiserror::Error;

use crate::types::{EngineState, LogKind};

/// Top-level error type for the ragchat session runtime.
#[derive(Debug, Error)]
pub enum RagChatError {
    #[error("engine load failed: {0}")]
    EngineLoad(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("device probe failed: {0}")]
    DeviceProbe(String),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// A lookup for the most recent log entry of a kind found nothing.
    /// Only a programming fault can cause this.
    #[error("no message log entry of kind `{0}`")]
    MissingLogEntry(LogKind),

    #[error("invalid engine state transition: {from} -> {to}")]
    InvalidTransition { from: EngineState, to: EngineState },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = RagChatError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagChatError::MissingLogEntry(LogKind::Secondary);
        assert_eq!(err.to_string(), "no message log entry of kind `secondary`");

        let err = RagChatError::InvalidTransition {
            from: EngineState::Unloaded,
            to: EngineState::Generating,
        };
        assert_eq!(
            err.to_string(),
            "invalid engine state transition: unloaded -> generating"
        );
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: RagChatError = anyhow::anyhow!("webgpu adapter lost").into();
        assert_eq!(err.to_string(), "webgpu adapter lost");
    }
}
