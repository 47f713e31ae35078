//! Sliding chat history sent to the model on each turn.

use std::collections::VecDeque;

use crate::chat::ChatTurn;

/// Default window: the last two user/assistant pairs.
pub const DEFAULT_HISTORY_WINDOW: usize = 4;

/// Bounded, insertion-ordered sequence of chat turns.
///
/// When a push exceeds the window the oldest turns are dropped from the front;
/// the retained turns are always the most recent suffix in original order.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    turns: VecDeque<ChatTurn>,
    window: usize,
}

impl ChatHistory {
    pub fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(window + 1),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Append a turn and truncate to the window.
    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push_back(turn);
        self.truncate();
    }

    fn truncate(&mut self) {
        while self.turns.len() > self.window {
            self.turns.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.back()
    }

    /// Owned snapshot of the current window, oldest first.
    pub fn to_vec(&self) -> Vec<ChatTurn> {
        self.turns.iter().cloned().collect()
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}
