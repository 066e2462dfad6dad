use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{CompletionClient, CompletionError, Preamble, build_completion_messages};
use crate::models::ChatMessage;
use crate::sessions::SessionStore;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("userId is required")]
    MissingUserId,
    #[error("prompt is required")]
    MissingPrompt,
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationReply {
    pub prompt: String,
    pub bot_response: String,
}

/// The conversational pipeline shared by the HTTP and WebSocket entry points.
#[derive(Clone)]
pub struct ConversationService {
    sessions: SessionStore,
    preamble: Preamble,
    client: Arc<dyn CompletionClient>,
}

impl ConversationService {
    pub fn new(sessions: SessionStore, preamble: Preamble, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            sessions,
            preamble,
            client,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// Runs one round trip for `user_id`.
    ///
    /// The user message is recorded before the completion call and is kept
    /// when the call fails; the assistant message is appended only on success.
    pub async fn reply(
        &self,
        user_id: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<ConversationReply, ConversationError> {
        let user_id = user_id
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConversationError::MissingUserId)?;
        let prompt = prompt
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConversationError::MissingPrompt)?;

        let handle = self.sessions.get_or_create(user_id);
        let mut session = handle.lock().await;

        let dropped = session.make_room_for_turn(self.sessions.policy().max_history_messages);
        if dropped > 0 {
            debug!(user_id, dropped, "trimmed session history to cap");
        }

        let user_message = ChatMessage::user(prompt);
        let messages = build_completion_messages(&self.preamble, session.history(), &user_message);
        session.push(user_message);

        debug!(
            user_id,
            history_len = session.history().len(),
            request_len = messages.len(),
            "sending completion request"
        );

        let reply = match self.client.complete(messages).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(user_id, error = %err, "completion failed; user turn kept without reply");
                return Err(err.into());
            }
        };

        let bot_response = reply.content.clone();
        session.push(ChatMessage::assistant(reply.content));

        Ok(ConversationReply {
            prompt: prompt.to_string(),
            bot_response,
        })
    }
}
