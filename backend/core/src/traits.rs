use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::chat::ChatTurn;

/// Stream of completion chunks produced by [`Engine::chat_stream`].
pub type ChatStream = BoxStream<'static, Result<ChatChunk>>;

/// Creates engines with the requested models loaded.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Load every model in `model_ids`, reporting progress as it goes.
    async fn load(&self, model_ids: &[String], progress: ProgressReporter) -> Result<Arc<dyn Engine>>;
}

/// A loaded inference engine. Single-threaded resource: callers must never
/// interleave two generations on one engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Start a streaming chat completion over `messages`.
    ///
    /// Implementations should stop emitting chunks once `cancel` fires.
    async fn chat_stream(
        &self,
        messages: Vec<ChatTurn>,
        options: ChatOptions,
        cancel: CancellationToken,
    ) -> Result<ChatStream>;

    /// The finalized text of the last completion produced by `model_id`.
    async fn final_message(&self, model_id: &str) -> Result<String>;

    /// Ask the engine to stop producing tokens as soon as possible.
    async fn interrupt(&self);

    /// Forget any conversation state the engine keeps between calls.
    async fn reset_chat(&self) -> Result<()>;

    async fn unload(&self) -> Result<()>;

    /// Embed `texts` with the embedding model `model_id`, one vector per text.
    async fn embed(&self, texts: &[String], model_id: &str) -> Result<Vec<Vec<f32>>>;

    /// Maximum buffer size, in bytes, addressable by one storage binding.
    async fn device_max_buffer_binding(&self) -> Result<u64>;

    async fn device_vendor(&self) -> Result<String>;
}

/// Options for a single chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Ask the engine to attach token usage statistics to the final chunk.
    pub include_usage: bool,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            include_usage: true,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// One chunk of a streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    pub delta: Option<String>,
    pub usage: Option<Usage>,
}

impl ChatChunk {
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            delta: Some(delta.into()),
            usage: None,
        }
    }

    pub fn usage(usage: Usage) -> Self {
        Self {
            delta: None,
            usage: Some(usage),
        }
    }
}

/// Token usage and throughput reported at the end of a completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub prefill_tokens_per_sec: f64,
    pub decode_tokens_per_sec: f64,
}

/// Progress notification emitted while models load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProgress {
    /// Overall progress in `[0.0, 1.0]`.
    pub fraction: f64,
    pub text: String,
}

/// Handle given to loaders for reporting progress back to the session.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: mpsc::UnboundedSender<LoadProgress>,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::UnboundedSender<LoadProgress>) -> Self {
        Self { tx }
    }

    /// Create a reporter together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LoadProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Report progress. Reports after the session stopped listening are dropped.
    pub fn report(&self, fraction: f64, text: impl Into<String>) {
        let _ = self.tx.send(LoadProgress {
            fraction,
            text: text.into(),
        });
    }
}
