//! Conversation history and how a finished reply is folded back into it.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use futures_util::StreamExt;
use serde::Serialize;

use crate::api::ChatRequest;
use crate::core::chat_stream::{ChatError, ChatStream, StreamEvent};
use crate::core::config::GenerationConfig;
use crate::core::message::{ConversationTurn, Role};
use crate::core::request::build_chat_request;

/// How one reply ended, as seen by the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Completed(String),
    Cancelled(String),
    Failed(ChatError),
}

impl ReplyOutcome {
    /// The text that should appear as the assistant's reply, if any.
    pub fn reply_text(&self) -> Option<String> {
        match self {
            ReplyOutcome::Completed(text) => Some(text.clone()),
            ReplyOutcome::Cancelled(partial) if partial.is_empty() => None,
            ReplyOutcome::Cancelled(partial) => Some(partial.clone()),
            ReplyOutcome::Failed(err) => Some(format!("Error: {err}")),
        }
    }
}

/// Drain `stream`, calling `on_delta` with each increment in arrival order.
pub async fn collect_reply<F>(mut stream: ChatStream, mut on_delta: F) -> ReplyOutcome
where
    F: FnMut(&str),
{
    let mut reply = String::new();
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Delta(text) => {
                on_delta(&text);
                reply.push_str(&text);
            }
            StreamEvent::Done => return ReplyOutcome::Completed(reply),
            StreamEvent::Failed(ChatError::Cancelled { partial }) => {
                return ReplyOutcome::Cancelled(partial)
            }
            StreamEvent::Failed(err) => return ReplyOutcome::Failed(err),
        }
    }
    ReplyOutcome::Completed(reply)
}

#[derive(Debug, Default, Clone)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedTurn<'a> {
    role: Role,
    content: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationExport<'a> {
    messages: Vec<ExportedTurn<'a>>,
    exported_at: String,
    model: &'a str,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ConversationTurn {
        self.push(ConversationTurn::user(content))
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> &ConversationTurn {
        self.push(ConversationTurn::assistant(content))
    }

    fn push(&mut self, turn: ConversationTurn) -> &ConversationTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// Build a request covering the whole history.
    pub fn request_for(
        &self,
        config: &GenerationConfig,
        stream: bool,
    ) -> Result<ChatRequest, ChatError> {
        build_chat_request(&self.turns, config, stream)
    }

    /// Record the assistant side of a finished exchange. Partial text from a
    /// cancelled reply is kept; failures are recorded as an error reply.
    /// Returns the recorded turn, if any.
    pub fn record_outcome(&mut self, outcome: &ReplyOutcome) -> Option<&ConversationTurn> {
        let text = outcome.reply_text()?;
        Some(self.push_assistant(text))
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn export_json(&self, model: &str) -> Result<String, serde_json::Error> {
        self.export_json_at(model, Utc::now())
    }

    fn export_json_at(
        &self,
        model: &str,
        exported_at: DateTime<Utc>,
    ) -> Result<String, serde_json::Error> {
        let export = ConversationExport {
            messages: self
                .turns
                .iter()
                .map(|turn| ExportedTurn {
                    role: turn.role(),
                    content: turn.content(),
                    timestamp: turn
                        .created_at()
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                })
                .collect(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            model,
        };
        serde_json::to_string_pretty(&export)
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("parley-export-{}.json", date.format("%Y-%m-%d"))
}
