//! Append-only conversation history

use crate::llm::ChatMessage;

/// Ordered message history for one session.
///
/// Replayed verbatim to the model on every call: nothing is ever removed,
/// rewritten, truncated or summarised.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Full history in insertion order
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[allow(dead_code)] // Used by runtime tests
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
