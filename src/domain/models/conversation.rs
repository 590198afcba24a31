use serde::Serialize;

use super::ChatMessage;

/// Append-only conversation history for a single session.
///
/// The system prompt is not part of the history; it is prepended to every
/// outbound request instead.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Explicit user reset ("Clear Chat").
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
