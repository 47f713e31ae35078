//! Session Event Logger
//!
//! Structured session events (prompts, completions, state changes, failures)
//! emitted through `tracing` under the `session_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Prompt {
        content: String,
    },
    Completion {
        content: String,
        completion_tokens: Option<u32>,
    },
    StateChange {
        from: String,
        to: String,
    },
    Failure {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

impl EventLogEntry {
    fn new(session_id: &str, mut event: SessionEvent) -> Self {
        match &mut event {
            SessionEvent::Prompt { content } | SessionEvent::Completion { content, .. } => {
                *content = redact_sensitive_data(content);
            }
            SessionEvent::Failure { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            SessionEvent::StateChange { .. } => {}
        }

        Self {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct SessionEventLogger;

impl SessionEventLogger {
    /// Redact and record a session event.
    pub fn log_event(session_id: &str, event: SessionEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_else(|e| e.to_string());

        if matches!(entry.event, SessionEvent::Failure { .. }) {
            warn!(target: "session_events", session_id = %entry.session_id, event = %json, "Session event");
        } else {
            info!(target: "session_events", session_id = %entry.session_id, event = %json, "Session event");
        }
    }
}
