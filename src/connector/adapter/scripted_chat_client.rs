use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::{ChatClient, CompletionRequest};
use crate::domain::{ChatMessage, DomainError};

/// A [`ChatClient`] that plays back queued replies and records every request.
///
/// Lets the conversation logic run without an inference server. Once the
/// script is exhausted every call fails with an endpoint error.
pub struct ScriptedChatClient {
    replies: Mutex<VecDeque<Result<ChatMessage, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    model: String,
    base_url: String,
}

impl ScriptedChatClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            model: "scripted".to_string(),
            base_url: "scripted://local".to_string(),
        }
    }

    pub fn with_reply(mut self, reply: ChatMessage) -> Self {
        self.replies.get_mut().push_back(Ok(reply));
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.replies.get_mut().push_back(Err(message.into()));
        self
    }

    pub async fn push_reply(&self, reply: ChatMessage) {
        self.replies.lock().await.push_back(Ok(reply));
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

impl Default for ScriptedChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<ChatMessage, DomainError> {
        self.requests.lock().await.push(request.clone());
        match self.replies.lock().await.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(DomainError::endpoint(message)),
            None => Err(DomainError::endpoint("No scripted reply left")),
        }
    }

    async fn test_connection(&self) -> Result<String, DomainError> {
        Ok("Scripted client is always reachable.".to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
