//! Session controller.
//!
//! Owns the engine lifecycle, chat history and message log for one page
//! session. Every user action that touches the engine becomes a task on a
//! single [`TaskQueue`]; the generation guard and the queue are kept in
//! agreement by deciding acceptance and enqueueing under one state lock.

use std::sync::Arc;

use futures::StreamExt;
use logging::{SessionEvent, SessionEventLogger};
use ragchat_core::{
    ChatOptions, ChatTurn, Engine, EngineLoader, EngineState, LoadProgress, LogKind,
    ProgressReporter, RagChatError, Result, Usage,
};
use ragchat_memory::{Catalog, CatalogRetriever, EngineEmbeddings, Retriever};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::device::probe_device;
use crate::message_log::{LogChange, LogEntry, READY_MESSAGE};
use crate::progress::progress_percent;
use crate::prompt::PromptBuilder;
use crate::session_state::{SessionSettings, SessionState};
use crate::task_queue::{TaskQueue, TaskTicket};
use crate::ui::{usage_label, UiState};

/// Placeholder shown in the assistant entry until the first token arrives.
pub const THINKING_MESSAGE: &str = "Thinking...";

/// Replaces the placeholder when the engine produced no text at all.
pub const EMPTY_REPLY_MESSAGE: &str = "_(no response)_";

const LOADING_MESSAGE: &str = "Loading models...";
const INDEXING_MESSAGE: &str = "Building product index...";
const RESTRICTED_NOTICE: &str = "This device has limited GPU resources. \
    Responses may be slow and long conversations may fail.";

/// Point-in-time copy of everything a front-end renders.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub engine_state: EngineState,
    pub ui: UiState,
    pub entries: Vec<LogEntry>,
    pub history: Vec<ChatTurn>,
    pub request_in_progress: bool,
    pub restricted: bool,
    pub log_revision: u64,
}

struct Completion {
    text: String,
    usage: Option<Usage>,
}

struct Shared {
    session_id: String,
    settings: SessionSettings,
    loader: Arc<dyn EngineLoader>,
    catalog: Arc<Catalog>,
    state: Mutex<SessionState>,
}

/// Drives one chat session. Must be created inside a Tokio runtime.
pub struct SessionController {
    shared: Arc<Shared>,
    queue: TaskQueue,
}

impl SessionController {
    pub fn new(
        settings: SessionSettings,
        loader: Arc<dyn EngineLoader>,
        catalog: Arc<Catalog>,
    ) -> Self {
        let session_id = Uuid::new_v4().to_string();
        info!(
            session_id = %session_id,
            chat_model = %settings.chat_model,
            products = catalog.len(),
            "Session created"
        );
        let state = SessionState::new(settings.history_window);
        Self {
            shared: Arc::new(Shared {
                session_id,
                settings,
                loader,
                catalog,
                state: Mutex::new(state),
            }),
            queue: TaskQueue::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.shared.session_id
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.shared.settings
    }

    /// Replace the contents of the chat input field.
    pub async fn set_input(&self, text: impl Into<String>) {
        self.shared.state.lock().await.ui.input = text.into();
    }

    /// Start loading models. Ignored unless the engine is unloaded.
    pub async fn download(&self) -> Option<TaskTicket> {
        let mut state = self.shared.state.lock().await;
        if state.engine_state != EngineState::Unloaded {
            debug!(state = %state.engine_state, "Download ignored");
            return None;
        }
        if let Err(e) = state.transition(&self.shared.session_id, EngineState::Loading) {
            error!(error = %e, "Cannot start loading");
            return None;
        }
        state.ui.progress_percent = Some(0);

        let shared = Arc::clone(&self.shared);
        Some(self.queue.enqueue("load", shared.run_load()))
    }

    /// Send the current input field contents as a prompt, clearing the field
    /// when the prompt is accepted.
    pub async fn submit(&self) -> Option<TaskTicket> {
        let mut state = self.shared.state.lock().await;
        if state.ui.input.trim().is_empty() {
            return None;
        }
        let prompt = state.ui.input.clone();
        let ticket = self.accept_generate(&mut state, prompt)?;
        state.ui.input.clear();
        Some(ticket)
    }

    /// Enqueue a generation for `prompt`.
    ///
    /// Returns `None` without touching any state when the prompt is blank, a
    /// generation is already outstanding, a reset is pending, or the engine is
    /// not ready.
    pub async fn generate(&self, prompt: impl Into<String>) -> Option<TaskTicket> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return None;
        }
        let mut state = self.shared.state.lock().await;
        self.accept_generate(&mut state, prompt)
    }

    /// Cancel any outstanding generation and enqueue a reset of the
    /// conversation.
    ///
    /// The cancellation takes effect immediately; the reset itself runs after
    /// every previously enqueued task has settled.
    pub async fn reset(&self) -> TaskTicket {
        let (ticket, interrupt) = {
            let mut state = self.shared.state.lock().await;
            state.pending_resets += 1;

            let interrupt = match state.cancel.as_ref() {
                Some(token) => {
                    info!("Cancelling outstanding generation");
                    token.cancel();
                    state.engine.clone()
                }
                None => None,
            };

            let shared = Arc::clone(&self.shared);
            (self.queue.enqueue("reset", shared.run_reset()), interrupt)
        };

        if let Some(engine) = interrupt {
            engine.interrupt().await;
        }
        ticket
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.state.lock().await;
        SessionSnapshot {
            engine_state: state.engine_state,
            ui: state.ui.clone(),
            entries: state.log.entries().to_vec(),
            history: state.history.to_vec(),
            request_in_progress: state.request_in_progress,
            restricted: state.restricted,
            log_revision: state.log.revision(),
        }
    }

    pub async fn subscribe_log(&self) -> broadcast::Receiver<LogChange> {
        self.shared.state.lock().await.log.subscribe()
    }

    /// Wait until every task enqueued so far has settled.
    pub async fn idle(&self) {
        self.queue.idle().await;
    }

    fn accept_generate(&self, state: &mut SessionState, prompt: String) -> Option<TaskTicket> {
        if !state.accepts_generate() {
            debug!(
                state = %state.engine_state,
                request_in_progress = state.request_in_progress,
                pending_resets = state.pending_resets,
                "Generate rejected"
            );
            return None;
        }
        if let Err(e) = state.transition(&self.shared.session_id, EngineState::Generating) {
            error!(error = %e, "Cannot start generation");
            return None;
        }

        let cancel = CancellationToken::new();
        state.request_in_progress = true;
        state.cancel = Some(cancel.clone());

        let shared = Arc::clone(&self.shared);
        Some(self.queue.enqueue("generate", shared.run_generate(prompt, cancel)))
    }
}

impl Shared {
    #[instrument(skip_all, fields(session_id = %self.session_id))]
    async fn run_load(self: Arc<Self>) -> anyhow::Result<()> {
        self.state.lock().await.log.append(LogKind::Info, LOADING_MESSAGE);

        let model_ids = self.settings.model_ids();
        info!(models = ?model_ids, "Loading models");

        let (engine, retriever) = match self.load_engine(&model_ids).await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!(error = %e, "Model load failed");
                SessionEventLogger::log_event(
                    &self.session_id,
                    SessionEvent::Failure {
                        error_msg: e.to_string(),
                    },
                );
                let mut state = self.state.lock().await;
                state.log.append(LogKind::Danger, &e.to_string());
                state.ui.progress_percent = None;
                state.transition(&self.session_id, EngineState::Unloaded)?;
                return Err(e.into());
            }
        };

        let probe = probe_device(engine.as_ref()).await;

        let mut state = self.state.lock().await;
        // The flag describes the engine being loaded now, not an earlier one.
        state.restricted = false;
        match probe {
            Ok(profile) => {
                if self.settings.device_policy.is_restricted(&profile) {
                    info!(vendor = %profile.vendor, "Device is resource-restricted");
                    state.restricted = true;
                    if !state.restricted_notice_shown {
                        state.log.append(LogKind::Info, RESTRICTED_NOTICE);
                        state.restricted_notice_shown = true;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Device probe failed, continuing");
                state.log.append(LogKind::Warning, &e.to_string());
            }
        }

        state.engine = Some(engine);
        state.retriever = Some(retriever);
        state.ui.progress_percent = Some(100);
        state.transition(&self.session_id, EngineState::Ready)?;
        state.log.append(LogKind::Info, READY_MESSAGE);
        info!("Session ready");
        Ok(())
    }

    async fn load_engine(&self, model_ids: &[String]) -> Result<(Arc<dyn Engine>, Arc<dyn Retriever>)> {
        let (reporter, mut progress) = ProgressReporter::channel();
        let mut load = self.loader.load(model_ids, reporter);

        let loaded = loop {
            tokio::select! {
                result = &mut load => break result,
                Some(update) = progress.recv() => self.apply_progress(&update).await?,
            }
        };
        while let Ok(update) = progress.try_recv() {
            self.apply_progress(&update).await?;
        }
        let engine = loaded.map_err(|e| RagChatError::EngineLoad(e.to_string()))?;

        self.narrate(INDEXING_MESSAGE).await?;
        let embedder = Arc::new(EngineEmbeddings::new(
            Arc::clone(&engine),
            &self.settings.embedding_model,
        ));
        let retriever =
            match CatalogRetriever::build(&self.catalog, embedder, self.settings.top_k).await {
                Ok(retriever) => retriever,
                Err(e) => {
                    if let Err(unload_err) = engine.unload().await {
                        warn!(error = %unload_err, "Engine unload after failed indexing failed");
                    }
                    return Err(RagChatError::Retrieval(e.to_string()));
                }
            };
        self.narrate(&format!("Indexed {} products.", self.catalog.len()))
            .await?;

        Ok((engine, Arc::new(retriever)))
    }

    async fn apply_progress(&self, update: &LoadProgress) -> Result<()> {
        let percent = progress_percent(update);
        debug!(percent, text = %update.text, "Load progress");

        let mut state = self.state.lock().await;
        state.ui.progress_percent = Some(percent);
        state.log.update_last_of_kind(LogKind::Info, &update.text, false)?;
        Ok(())
    }

    async fn narrate(&self, line: &str) -> Result<()> {
        self.state
            .lock()
            .await
            .log
            .update_last_of_kind(LogKind::Info, line, true)?;
        Ok(())
    }

    #[instrument(skip_all, fields(session_id = %self.session_id))]
    async fn run_generate(self: Arc<Self>, prompt: String, cancel: CancellationToken) -> anyhow::Result<()> {
        SessionEventLogger::log_event(
            &self.session_id,
            SessionEvent::Prompt {
                content: prompt.clone(),
            },
        );

        let result = self.reply(&prompt, &cancel).await;
        if let Err(e) = &result {
            self.fail_generation(e).await;
        }

        let mut state = self.state.lock().await;
        state.request_in_progress = false;
        state.cancel = None;
        if state.engine_state == EngineState::Generating {
            state.transition(&self.session_id, EngineState::Ready)?;
        }
        result.map_err(Into::into)
    }

    async fn reply(&self, prompt: &str, cancel: &CancellationToken) -> Result<()> {
        let (engine, retriever, history) = {
            let mut state = self.state.lock().await;
            state.log.append(LogKind::Primary, prompt);
            state.history.push(ChatTurn::user(prompt));
            state.log.append(LogKind::Secondary, THINKING_MESSAGE);
            (state.engine.clone(), state.retriever.clone(), state.history.to_vec())
        };
        let (Some(engine), Some(retriever)) = (engine, retriever) else {
            return Err(RagChatError::Generation("no engine loaded".to_string()));
        };

        let completion = self
            .complete(engine.as_ref(), retriever.as_ref(), prompt, &history, cancel)
            .await?;

        let mut state = self.state.lock().await;
        let shown = if completion.text.is_empty() {
            warn!("Engine returned an empty reply");
            EMPTY_REPLY_MESSAGE
        } else {
            completion.text.as_str()
        };
        state.log.update_last_of_kind(LogKind::Secondary, shown, false)?;
        // Keep user and assistant turns paired even when nothing came back.
        state.history.push(ChatTurn::assistant(completion.text.as_str()));
        if let Some(usage) = &completion.usage {
            state.ui.status_label = Some(usage_label(usage));
        }
        drop(state);

        SessionEventLogger::log_event(
            &self.session_id,
            SessionEvent::Completion {
                content: completion.text,
                completion_tokens: completion.usage.map(|u| u.completion_tokens),
            },
        );
        Ok(())
    }

    async fn complete(
        &self,
        engine: &dyn Engine,
        retriever: &dyn Retriever,
        prompt: &str,
        history: &[ChatTurn],
        cancel: &CancellationToken,
    ) -> Result<Completion> {
        let documents = retriever
            .retrieve_top_k(prompt)
            .await
            .map_err(|e| RagChatError::Retrieval(e.to_string()))?;
        debug!(documents = documents.len(), "Retrieved catalog context");

        let messages = PromptBuilder::new(&self.settings.system_prompt).build(history, &documents);
        let options = ChatOptions {
            include_usage: true,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        let mut stream = engine
            .chat_stream(messages, options, cancel.clone())
            .await
            .map_err(|e| RagChatError::Generation(e.to_string()))?;

        let mut text = String::new();
        let mut usage = None;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(received = text.len(), "Generation interrupted");
                    None
                }
                chunk = stream.next() => chunk,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|e| RagChatError::Generation(e.to_string()))?;

            if let Some(delta) = chunk.delta.filter(|d| !d.is_empty()) {
                text.push_str(&delta);
                self.state
                    .lock()
                    .await
                    .log
                    .update_last_of_kind(LogKind::Secondary, &text, false)?;
            }
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
        }
        drop(stream);

        let final_text = engine
            .final_message(&self.settings.chat_model)
            .await
            .map_err(|e| RagChatError::Generation(e.to_string()))?;
        if !final_text.is_empty() {
            text = final_text;
        }
        Ok(Completion { text, usage })
    }

    /// Report the failure and tear the engine down so the user has to reload.
    async fn fail_generation(&self, err: &RagChatError) {
        error!(error = %err, "Generation failed, unloading engine");
        SessionEventLogger::log_event(
            &self.session_id,
            SessionEvent::Failure {
                error_msg: err.to_string(),
            },
        );

        let engine = {
            let mut state = self.state.lock().await;
            state.log.append(LogKind::Danger, &err.to_string());
            if let Err(e) = state.transition(&self.session_id, EngineState::Unloading) {
                error!(error = %e, "Unexpected state during teardown");
            }
            state.retriever = None;
            state.engine.take()
        };

        if let Some(engine) = engine {
            if let Err(e) = engine.unload().await {
                warn!(error = %e, "Engine unload failed");
            }
        }

        let mut state = self.state.lock().await;
        state.ui.progress_percent = None;
        if let Err(e) = state.transition(&self.session_id, EngineState::Unloaded) {
            error!(error = %e, "Unexpected state during teardown");
        }
    }

    #[instrument(skip_all, fields(session_id = %self.session_id))]
    async fn run_reset(self: Arc<Self>) -> anyhow::Result<()> {
        let engine = self.state.lock().await.engine.clone();
        let reset = match engine {
            Some(engine) => engine.reset_chat().await,
            None => Ok(()),
        };

        let mut state = self.state.lock().await;
        state.pending_resets = state.pending_resets.saturating_sub(1);
        state.history.clear();
        state.log.reset_all();
        state.ui.status_label = None;

        if let Err(e) = reset {
            warn!(error = %e, "Engine chat reset failed");
            state
                .log
                .append(LogKind::Warning, &format!("Engine chat reset failed: {e}"));
            return Err(e);
        }
        info!("Conversation reset");
        Ok(())
    }
}
