//! Retrieval-augmented prompt assembly.

use ragchat_core::{ChatTurn, Role};
use ragchat_memory::Document;

pub struct PromptBuilder<'a> {
    system_prompt: &'a str,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(system_prompt: &'a str) -> Self {
        Self { system_prompt }
    }

    /// Messages for one completion: the system prompt followed by the
    /// windowed history, with the final user turn wrapped in catalog context.
    pub fn build(&self, history: &[ChatTurn], documents: &[Document]) -> Vec<ChatTurn> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatTurn::system(self.system_prompt));

        let last_user = history.iter().rposition(|t| t.role() == Role::User);
        for (i, turn) in history.iter().enumerate() {
            if Some(i) == last_user {
                messages.push(ChatTurn::user(Self::with_context(turn.content(), documents)));
            } else {
                messages.push(turn.clone());
            }
        }
        messages
    }

    fn with_context(question: &str, documents: &[Document]) -> String {
        let mut out = String::from("Context:\n");
        if documents.is_empty() {
            out.push_str("(no matching products)\n");
        }
        for (i, doc) in documents.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n\n", i + 1, doc.content));
        }
        out.push_str(&format!("\nQuestion: {question}"));
        out
    }
}
