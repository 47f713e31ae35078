//! Structured logging for ragchat sessions.
//!
//! Handles subscriber setup, log redaction, and session event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, SessionEvent, SessionEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
