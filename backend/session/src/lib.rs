//! RagChat Session Runtime
//!
//! Serializes user actions on a single task queue and drives the engine
//! lifecycle, retrieval-augmented generation, chat history and message log.

pub mod bootstrap;
pub mod controller;
pub mod device;
pub mod message_log;
pub mod progress;
pub mod prompt;
pub mod session_state;
pub mod task_queue;
pub mod ui;

pub use bootstrap::{start_session, start_with_config};
pub use controller::{SessionController, SessionSnapshot, EMPTY_REPLY_MESSAGE, THINKING_MESSAGE};
pub use device::{probe_device, DevicePolicy, DeviceProfile};
pub use message_log::{EntryId, LogChange, LogEntry, MessageLog, READY_MESSAGE};
pub use progress::progress_percent;
pub use prompt::PromptBuilder;
pub use session_state::{SessionSettings, SessionState};
pub use task_queue::{TaskOutcome, TaskQueue, TaskTicket};
pub use ui::{usage_label, UiState};
