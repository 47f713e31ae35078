//! Visible conversation transcript.
//!
//! Entries are tagged with a [`LogKind`] and hold sanitized HTML. The log keeps
//! an index from kind to its most recent entry so streamed tokens can rewrite
//! that entry in place.

use std::collections::HashMap;

use markdown::Renderer;
use ragchat_core::{LogKind, RagChatError, Result};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Text of the info entry left behind by [`MessageLog::reset_all`].
pub const READY_MESSAGE: &str = "Ready. Ask me anything about the catalog.";

const CHANGE_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: EntryId,
    pub kind: LogKind,
    pub html: String,
}

/// Mutations published to front-ends mirroring the log.
/// `Appended` and `Updated` both imply scrolling to the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogChange {
    Appended { id: EntryId, kind: LogKind },
    Updated { id: EntryId, kind: LogKind },
    Cleared,
}

pub struct MessageLog {
    entries: Vec<LogEntry>,
    last_of_kind: HashMap<LogKind, usize>,
    next_id: u64,
    revision: u64,
    renderer: Renderer,
    changes: broadcast::Sender<LogChange>,
}

impl MessageLog {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            entries: Vec::new(),
            last_of_kind: HashMap::new(),
            next_id: 1,
            revision: 0,
            renderer: Renderer::default(),
            changes,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogChange> {
        self.changes.subscribe()
    }

    /// Render `text` and add it as a new entry at the end of the log.
    pub fn append(&mut self, kind: LogKind, text: &str) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;

        self.entries.push(LogEntry {
            id,
            kind,
            html: self.renderer.render(text),
        });
        self.last_of_kind.insert(kind, self.entries.len() - 1);
        self.publish(LogChange::Appended { id, kind });
        id
    }

    /// Re-render the most recent entry of `kind`.
    ///
    /// With `keep_existing` the rendered text is appended to the entry's
    /// current content instead of replacing it. Returns `Ok(false)` when the
    /// result is identical to what is already shown.
    pub fn update_last_of_kind(&mut self, kind: LogKind, text: &str, keep_existing: bool) -> Result<bool> {
        let Some(&index) = self.last_of_kind.get(&kind) else {
            error!(%kind, "Update requested for a kind with no entries");
            return Err(RagChatError::MissingLogEntry(kind));
        };

        let rendered = self.renderer.render(text);
        let entry = &mut self.entries[index];
        let html = if keep_existing {
            format!("{}{}", entry.html, rendered)
        } else {
            rendered
        };

        if html == entry.html {
            return Ok(false);
        }

        entry.html = html;
        let id = entry.id;
        self.publish(LogChange::Updated { id, kind });
        Ok(true)
    }

    /// Remove every entry and leave a single fresh "ready" info entry.
    pub fn reset_all(&mut self) {
        debug!(removed = self.entries.len(), "Resetting message log");
        self.entries.clear();
        self.last_of_kind.clear();
        self.publish(LogChange::Cleared);
        self.append(LogKind::Info, READY_MESSAGE);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last_of_kind(&self, kind: LogKind) -> Option<&LogEntry> {
        self.last_of_kind.get(&kind).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn publish(&mut self, change: LogChange) {
        self.revision += 1;
        let _ = self.changes.send(change);
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
