use async_trait::async_trait;

use crate::domain::{ChatMessage, DomainError, ToolDefinition};

/// Everything one chat-completions call needs apart from the model name,
/// which belongs to the client.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    /// Empty means the request carries no `tools` field at all.
    pub tools: Vec<ToolDefinition>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// An interface for sending a conversation to a chat-completions endpoint
/// and receiving the assistant's next message.
///
/// Implementors encapsulate transport, serialization and vendor details.
/// The returned message may carry tool calls instead of (or besides) text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<ChatMessage, DomainError>;

    /// Cheap round trip to confirm the endpoint answers for the configured
    /// model. Returns a human-readable status line.
    async fn test_connection(&self) -> Result<String, DomainError>;

    fn model(&self) -> &str;

    fn base_url(&self) -> &str;
}
