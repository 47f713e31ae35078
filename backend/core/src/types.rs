use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of the single inference engine owned by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Generating,
    Unloading,
}

impl EngineState {
    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// Any state may fall back to `Unloaded` after an unrecoverable engine error.
    pub fn can_transition_to(self, next: EngineState) -> bool {
        use EngineState::*;
        matches!(
            (self, next),
            (Unloaded, Loading)
                | (Loading, Ready)
                | (Ready, Generating)
                | (Ready, Ready)
                | (Generating, Ready)
                | (_, Unloading)
                | (_, Unloaded)
        )
    }

    pub fn is_busy(self) -> bool {
        matches!(self, EngineState::Loading | EngineState::Generating | EngineState::Unloading)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Unloaded => "unloaded",
            EngineState::Loading => "loading",
            EngineState::Ready => "ready",
            EngineState::Generating => "generating",
            EngineState::Unloading => "unloading",
        };
        f.write_str(s)
    }
}

/// Tag carried by every message log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// User prompts.
    Primary,
    /// Assistant replies, including the streaming placeholder.
    Secondary,
    Warning,
    Error,
    Danger,
    /// Progress narration and session notices.
    Info,
}

impl LogKind {
    pub const ALL: [LogKind; 6] = [
        LogKind::Primary,
        LogKind::Secondary,
        LogKind::Warning,
        LogKind::Error,
        LogKind::Danger,
        LogKind::Info,
    ];
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogKind::Primary => "primary",
            LogKind::Secondary => "secondary",
            LogKind::Warning => "warning",
            LogKind::Error => "error",
            LogKind::Danger => "danger",
            LogKind::Info => "info",
        };
        f.write_str(s)
    }
}
