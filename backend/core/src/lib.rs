pub mod chat;
pub mod error;
pub mod history;
pub mod traits;
pub mod types;

pub use chat::{ChatTurn, Role};
pub use error::{RagChatError, Result};
pub use history::{ChatHistory, DEFAULT_HISTORY_WINDOW};
pub use traits::{
    ChatChunk, ChatOptions, ChatStream, Engine, EngineLoader, LoadProgress, ProgressReporter,
    Usage,
};
pub use types::{EngineState, LogKind};
