use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::policy::RETAIL_AGENT_POLICY;
use super::{ToolCatalog, ToolExecutor};
use crate::application::{ChatClient, CompletionRequest, RetailRepository};
use crate::domain::{split_reasoning, ChatMessage, Conversation, DomainError, Segment, ToolDefinition};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 1;

const TOOL_LIMIT_MESSAGE: &str = "Tool call limit reached for this turn; ask the user to continue.";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Tool-result round trips allowed per user turn.
    pub max_tool_rounds: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            system_prompt: RETAIL_AGENT_POLICY.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

/// A tool call as the front-end shows it: what was asked and what came back.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub call_id: String,
    pub name: String,
    pub arguments: Value,
    pub result: Value,
    /// False when the call was answered with the round-limit notice instead.
    pub executed: bool,
}

/// Result of one user turn.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TurnOutcome {
    /// Content of the last assistant message, verbatim.
    pub reply: String,
    pub reasoning: Option<String>,
    pub segments: Vec<Segment>,
    pub assistant_messages: Vec<ChatMessage>,
    pub tool_invocations: Vec<ToolInvocation>,
    pub round_trips: usize,
}

/// One user's conversation with the retail agent.
///
/// Owns the history, the enabled tool set and the tool executor bound to the
/// session's own copy of the mock database. A turn is one user message, one
/// completion, and for each batch of tool calls one more completion after the
/// tool results are appended.
pub struct ChatSession {
    client: Arc<dyn ChatClient>,
    executor: ToolExecutor,
    catalog: Arc<ToolCatalog>,
    enabled_tools: BTreeSet<String>,
    conversation: Conversation,
    settings: SessionSettings,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("enabled_tools", &self.enabled_tools)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// All catalog tools start enabled.
    pub fn new(
        client: Arc<dyn ChatClient>,
        repository: Arc<dyn RetailRepository>,
        catalog: Arc<ToolCatalog>,
        settings: SessionSettings,
    ) -> Self {
        let enabled_tools = catalog.names().into_iter().collect();
        Self {
            client,
            executor: ToolExecutor::new(repository),
            catalog,
            enabled_tools,
            conversation: Conversation::new(),
            settings,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn repository(&self) -> &Arc<dyn RetailRepository> {
        self.executor.repository()
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn client(&self) -> &Arc<dyn ChatClient> {
        &self.client
    }

    pub fn enabled_tools(&self) -> &BTreeSet<String> {
        &self.enabled_tools
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_tools.contains(name)
    }

    /// Replaces the enabled set. Names must come from the catalog.
    pub fn set_enabled_tools<I, S>(&mut self, names: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if let Some(unknown) = names.iter().find(|n| !self.catalog.contains(n)) {
            return Err(DomainError::invalid_input(format!("Unknown tool: {}", unknown)));
        }
        debug!("Enabled tools: {:?}", names);
        self.enabled_tools = names;
        Ok(())
    }

    pub fn reset(&mut self) {
        info!("Clearing conversation ({} messages)", self.conversation.len());
        self.conversation.clear();
    }

    /// Runs one user turn.
    ///
    /// Turns appended before an endpoint failure stay in the history.
    pub async fn send(&mut self, text: &str) -> Result<TurnOutcome, DomainError> {
        self.conversation.push(ChatMessage::user(text));

        let mut outcome = TurnOutcome::default();
        let mut reply = self.next_assistant_message(&mut outcome).await?;

        while reply.has_tool_calls() {
            if outcome.round_trips >= self.settings.max_tool_rounds {
                warn!(
                    "Model requested {} more tool call(s) after {} round trip(s); not executing",
                    reply.tool_calls.len(),
                    outcome.round_trips
                );
                for call in &reply.tool_calls {
                    let result = json!({ "error": TOOL_LIMIT_MESSAGE });
                    self.conversation
                        .push(ChatMessage::tool(call.id.clone(), result.to_string()));
                    outcome.tool_invocations.push(ToolInvocation {
                        call_id: call.id.clone(),
                        name: call.name().to_string(),
                        arguments: Value::Object(call.parsed_arguments()),
                        result,
                        executed: false,
                    });
                }
                break;
            }

            for call in &reply.tool_calls {
                let arguments = call.parsed_arguments();
                let result = self.executor.execute(call.name(), &arguments).await;
                self.conversation
                    .push(ChatMessage::tool(call.id.clone(), serde_json::to_string(&result)?));
                outcome.tool_invocations.push(ToolInvocation {
                    call_id: call.id.clone(),
                    name: call.name().to_string(),
                    arguments: Value::Object(arguments),
                    result,
                    executed: true,
                });
            }

            outcome.round_trips += 1;
            reply = self.next_assistant_message(&mut outcome).await?;
        }

        outcome.reply = reply.content.clone();
        outcome.reasoning = reply.reasoning.clone();
        outcome.segments = split_reasoning(&reply.content);
        Ok(outcome)
    }

    async fn next_assistant_message(&mut self, outcome: &mut TurnOutcome) -> Result<ChatMessage, DomainError> {
        let request = self.build_request();
        debug!(
            "Requesting completion: {} messages, {} tools",
            request.messages.len(),
            request.tools.len()
        );

        let mut reply = self.client.complete(&request).await?;
        self.assign_missing_call_ids(&mut reply);

        self.conversation.push(reply.clone());
        outcome.assistant_messages.push(reply.clone());
        Ok(reply)
    }

    fn build_request(&self) -> CompletionRequest {
        CompletionRequest {
            system: self.settings.system_prompt.clone(),
            messages: self.conversation.messages().to_vec(),
            tools: self.active_tools(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    fn active_tools(&self) -> Vec<ToolDefinition> {
        self.catalog.select(&self.enabled_tools)
    }

    /// Tool turns are matched to calls by id, so blank ids get a local one.
    fn assign_missing_call_ids(&self, reply: &mut ChatMessage) {
        let base = self.conversation.len();
        for (i, call) in reply.tool_calls.iter_mut().enumerate() {
            if call.id.is_empty() {
                call.id = format!("call_{}_{}", base, i);
            }
        }
    }
}
