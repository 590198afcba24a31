use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::application::{ChatSession, TurnOutcome};
use crate::domain::Segment;

use super::super::Container;

const PROMPT: &str = "you> ";
const BANNER: &str = "Retail agent chat. Commands: /reset clears the history, /tools lists enabled tools, /quit exits.";

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Interactive loop on stdin/stdout.
    pub async fn chat(&self) -> Result<String> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run(stdin, stdout).await
    }

    /// Reads one message per line until `/quit` or EOF. Endpoint errors are
    /// printed and the loop goes on.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut session = self.container.new_session();
        let mut lines = reader.lines();
        let mut turns = 0usize;

        writer.write_all(format!("{}\n", BANNER).as_bytes()).await?;

        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            match line {
                "" => continue,
                "/quit" | "/exit" => break,
                "/reset" => {
                    session.reset();
                    writer.write_all(b"(conversation cleared)\n").await?;
                }
                "/tools" => {
                    writer.write_all(format_enabled_tools(&session).as_bytes()).await?;
                }
                text => {
                    debug!("Terminal turn {}", turns + 1);
                    match session.send(text).await {
                        Ok(outcome) => {
                            turns += 1;
                            writer.write_all(render_outcome(&outcome).as_bytes()).await?;
                        }
                        Err(e) => {
                            writer.write_all(format!("error: {}\n", e).as_bytes()).await?;
                        }
                    }
                }
            }
            writer.flush().await?;
        }

        Ok(format!(
            "Session ended after {} turn(s), {} message(s) in history.",
            turns,
            session.conversation().len()
        ))
    }
}

fn format_enabled_tools(session: &ChatSession) -> String {
    let enabled = session.enabled_tools();
    if enabled.is_empty() {
        return "(no tools enabled)\n".to_string();
    }
    let mut output = String::new();
    for name in enabled {
        output.push_str(&format!("  {}\n", name));
    }
    output
}

/// Terminal rendering of a turn: reasoning, tool traffic, then the answer.
pub fn render_outcome(outcome: &TurnOutcome) -> String {
    let mut output = String::new();

    for message in &outcome.assistant_messages {
        if let Some(reasoning) = &message.reasoning {
            push_thinking(&mut output, reasoning);
        }
    }

    for invocation in &outcome.tool_invocations {
        output.push_str(&format!("[tool call] {}({})\n", invocation.name, invocation.arguments));
        output.push_str(&format!("[tool result] {}\n", invocation.result));
    }

    for segment in &outcome.segments {
        match segment {
            Segment::Thinking(text) => push_thinking(&mut output, text),
            Segment::Answer(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    output.push_str(&format!("agent> {}\n", text));
                }
            }
        }
    }

    output
}

fn push_thinking(output: &mut String, text: &str) {
    for line in text.trim().lines() {
        output.push_str(&format!("  | {}\n", line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ToolInvocation;
    use crate::domain::{split_reasoning, ChatMessage};
    use serde_json::json;

    #[test]
    fn test_render_outcome_orders_thinking_tools_answer() {
        let content = "<think>look it up</think>Your order is pending.";
        let outcome = TurnOutcome {
            reply: content.to_string(),
            reasoning: None,
            segments: split_reasoning(content),
            assistant_messages: vec![ChatMessage::assistant(content)],
            tool_invocations: vec![ToolInvocation {
                call_id: "call_1".to_string(),
                name: "get_order_details".to_string(),
                arguments: json!({"order_id": "#W1000000"}),
                result: json!({"status": "pending"}),
                executed: true,
            }],
            round_trips: 1,
        };

        let rendered = render_outcome(&outcome);
        let call = rendered.find("[tool call] get_order_details").unwrap();
        let thinking = rendered.find("  | look it up").unwrap();
        let answer = rendered.find("agent> Your order is pending.").unwrap();
        assert!(call < thinking);
        assert!(thinking < answer);
    }

    #[test]
    fn test_render_outcome_shows_server_reasoning() {
        let message = ChatMessage::assistant("Hi").with_reasoning("greet the user");
        let outcome = TurnOutcome {
            reply: "Hi".to_string(),
            segments: split_reasoning("Hi"),
            assistant_messages: vec![message],
            ..TurnOutcome::default()
        };

        let rendered = render_outcome(&outcome);
        assert!(rendered.starts_with("  | greet the user\n"));
        assert!(rendered.ends_with("agent> Hi\n"));
    }
}
