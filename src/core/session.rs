use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::chat_stream::{chat_endpoint, stream_chat, ChatError, ChatStream, StreamParams};
use crate::core::config::{Config, GenerationConfig};
use crate::core::conversation::{Conversation, ReplyOutcome};
use crate::core::message::ConversationTurn;
use crate::utils::logging::LoggingState;

/// State for one interactive chat: settings snapshot, history and transcript.
pub struct ChatSession {
    client: reqwest::Client,
    config: Config,
    model: String,
    stream: bool,
    conversation: Conversation,
    logging: LoggingState,
}

impl ChatSession {
    pub fn new(
        client: reqwest::Client,
        config: Config,
        model_override: Option<String>,
        stream: bool,
        logging: LoggingState,
    ) -> Self {
        let model = model_override
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| config.model().to_string());
        Self {
            client,
            config,
            model,
            stream,
            conversation: Conversation::new(),
            logging,
        }
    }

    pub fn generation_config(&self) -> GenerationConfig {
        self.config.generation_config(Some(&self.model))
    }

    pub fn has_credential(&self) -> bool {
        self.generation_config().has_credential()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn logging(&self) -> &LoggingState {
        &self.logging
    }

    pub fn logging_mut(&mut self) -> &mut LoggingState {
        &mut self.logging
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Record `text` as the next user turn and open the reply stream.
    ///
    /// Without a credential nothing is recorded or sent and
    /// [`ChatError::MissingCredential`] is returned.
    pub fn begin_reply(
        &mut self,
        text: &str,
        cancel_token: CancellationToken,
    ) -> Result<ChatStream, ChatError> {
        let generation = self.generation_config();
        if !generation.has_credential() {
            return Err(ChatError::MissingCredential);
        }

        let turn = self.conversation.push_user(text).clone();
        self.log_turn(&turn);

        let request = self.conversation.request_for(&generation, self.stream)?;
        stream_chat(StreamParams {
            client: self.client.clone(),
            endpoint: chat_endpoint(&self.config.resolve_base_url()),
            credential: generation.credential,
            request,
            cancel_token,
        })
    }

    /// Fold a finished reply into the history and transcript.
    pub fn finish_reply(&mut self, outcome: &ReplyOutcome) {
        if let Some(turn) = self.conversation.record_outcome(outcome).cloned() {
            self.log_turn(&turn);
        }
    }

    fn log_turn(&self, turn: &ConversationTurn) {
        if let Err(err) = self.logging.log_turn(turn) {
            warn!(error = %err, "failed to write transcript");
        }
    }
}
