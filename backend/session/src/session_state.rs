//! Session settings and the mutable state owned by a session controller.

use std::sync::Arc;

use logging::{SessionEvent, SessionEventLogger};
use ragchat_config::RagChatConfig;
use ragchat_core::{ChatHistory, Engine, EngineState, RagChatError, Result};
use ragchat_memory::Retriever;
use tokio_util::sync::CancellationToken;

use crate::device::DevicePolicy;
use crate::message_log::MessageLog;
use crate::ui::UiState;

/// Resolved settings a session runs with.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub chat_model: String,
    pub embedding_model: String,
    pub history_window: usize,
    pub top_k: usize,
    pub system_prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub device_policy: DevicePolicy,
}

impl SessionSettings {
    pub fn from_config(config: &RagChatConfig) -> Self {
        Self {
            chat_model: config.chat_model().to_string(),
            embedding_model: config.embedding_model().to_string(),
            history_window: config.history_window(),
            top_k: config.top_k(),
            system_prompt: config.system_prompt().to_string(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            device_policy: DevicePolicy {
                restricted_vendors: config.restricted_vendors(),
                min_buffer_binding_bytes: config.min_buffer_binding_bytes(),
            },
        }
    }

    /// Models the engine must load, embedding model first.
    pub fn model_ids(&self) -> Vec<String> {
        vec![self.embedding_model.clone(), self.chat_model.clone()]
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&RagChatConfig::default())
    }
}

/// Everything the controller mutates, guarded by a single lock.
pub struct SessionState {
    pub engine_state: EngineState,
    pub engine: Option<Arc<dyn Engine>>,
    pub retriever: Option<Arc<dyn Retriever>>,
    pub history: ChatHistory,
    pub log: MessageLog,
    pub ui: UiState,
    /// Set from the moment a generate is accepted until its task settles.
    pub request_in_progress: bool,
    /// Resets enqueued but not yet run.
    pub pending_resets: usize,
    /// Cancellation for the outstanding generation, if any.
    pub cancel: Option<CancellationToken>,
    pub restricted: bool,
    pub restricted_notice_shown: bool,
}

impl SessionState {
    pub fn new(history_window: usize) -> Self {
        Self {
            engine_state: EngineState::Unloaded,
            engine: None,
            retriever: None,
            history: ChatHistory::new(history_window),
            log: MessageLog::new(),
            ui: UiState::new(),
            request_in_progress: false,
            pending_resets: 0,
            cancel: None,
            restricted: false,
            restricted_notice_shown: false,
        }
    }

    /// Move the engine to `to`, refreshing the controls and recording the change.
    pub fn transition(&mut self, session_id: &str, to: EngineState) -> Result<()> {
        let from = self.engine_state;
        if !from.can_transition_to(to) {
            return Err(RagChatError::InvalidTransition { from, to });
        }
        self.engine_state = to;
        self.ui.apply_engine_state(to);
        if from != to {
            SessionEventLogger::log_event(
                session_id,
                SessionEvent::StateChange {
                    from: from.to_string(),
                    to: to.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Whether a new generate may be accepted right now.
    pub fn accepts_generate(&self) -> bool {
        self.engine_state == EngineState::Ready
            && !self.request_in_progress
            && self.pending_resets == 0
    }
}
