//! Control surface state projected from the engine state.

use ragchat_core::{EngineState, Usage};
use serde::Serialize;

/// What the page should show besides the message log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiState {
    /// Current contents of the chat input field.
    pub input: String,
    pub send_enabled: bool,
    pub reset_enabled: bool,
    pub download_enabled: bool,
    /// Model download progress, 0..=100.
    pub progress_percent: Option<u8>,
    /// Token usage of the last completion.
    pub status_label: Option<String>,
}

impl UiState {
    pub fn new() -> Self {
        let mut ui = Self::default();
        ui.apply_engine_state(EngineState::Unloaded);
        ui
    }

    /// Enable or disable the controls for `state`.
    pub fn apply_engine_state(&mut self, state: EngineState) {
        let (send, reset, download) = match state {
            EngineState::Unloaded => (false, true, true),
            EngineState::Loading | EngineState::Unloading => (false, false, false),
            EngineState::Ready => (true, true, false),
            EngineState::Generating => (false, true, false),
        };
        self.send_enabled = send;
        self.reset_enabled = reset;
        self.download_enabled = download;
    }
}

/// Format usage statistics for the status label.
pub fn usage_label(usage: &Usage) -> String {
    format!(
        "prompt: {} tokens, completion: {} tokens, prefill: {:.1} tok/s, decode: {:.1} tok/s",
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.prefill_tokens_per_sec,
        usage.decode_tokens_per_sec
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_per_state() {
        let mut ui = UiState::new();
        assert!(ui.download_enabled && !ui.send_enabled);

        ui.apply_engine_state(EngineState::Loading);
        assert!(!ui.download_enabled && !ui.send_enabled && !ui.reset_enabled);

        ui.apply_engine_state(EngineState::Ready);
        assert!(ui.send_enabled && ui.reset_enabled && !ui.download_enabled);

        ui.apply_engine_state(EngineState::Generating);
        assert!(!ui.send_enabled && ui.reset_enabled);
    }

    #[test]
    fn test_usage_label() {
        let label = usage_label(&Usage {
            prompt_tokens: 312,
            completion_tokens: 48,
            prefill_tokens_per_sec: 523.14,
            decode_tokens_per_sec: 21.06,
        });
        assert_eq!(
            label,
            "prompt: 312 tokens, completion: 48 tokens, prefill: 523.1 tok/s, decode: 21.1 tok/s"
        );
    }
}
