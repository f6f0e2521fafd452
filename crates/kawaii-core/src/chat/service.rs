//! Chat service orchestrating one exchange end to end.
//!
//! An exchange moves through fixed steps: validate the message, resolve or
//! create the conversation, load its history, obtain the assistant reply,
//! persist the user and assistant turns together, and return the reply.
//! Steps run strictly in sequence and nothing is retried.

use chrono::Utc;
use tracing::{debug, info};

use kawaii_types::chat::{ConversationId, ConversationSummary, NewTurn};
use kawaii_types::error::{ChatError, RepositoryError};

use crate::chat::history::{History, HistoryAssembler};
use crate::chat::repository::ConversationRepository;
use crate::llm::completion::CompletionClient;

/// Result of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub reply: String,
    pub conversation_id: ConversationId,
}

/// Check the incoming message text.
///
/// `None` means the field was absent; a blank string counts as empty.
pub fn validate_message(message: Option<&str>) -> Result<&str, ChatError> {
    match message {
        None => Err(ChatError::Validation("Invalid request data".to_string())),
        Some(text) if text.trim().is_empty() => {
            Err(ChatError::Validation("No message provided".to_string()))
        }
        Some(text) => Ok(text),
    }
}

/// Generic over `ConversationRepository` so kawaii-core never depends on
/// kawaii-infra.
pub struct ChatService<C: ConversationRepository> {
    repo: C,
    completion: CompletionClient,
}

impl<C: ConversationRepository> ChatService<C> {
    pub fn new(repo: C, completion: CompletionClient) -> Self {
        Self { repo, completion }
    }

    /// Access the conversation repository.
    pub fn repo(&self) -> &C {
        &self.repo
    }

    /// Run one chat exchange.
    ///
    /// Without a `conversation_id` a new conversation is created first. The
    /// reply never fails because of the provider; storage failures surface
    /// as [`ChatError::Persistence`].
    pub async fn exchange(
        &self,
        message: Option<&str>,
        conversation_id: Option<ConversationId>,
    ) -> Result<ExchangeOutcome, ChatError> {
        let message = validate_message(message)?;

        let conversation_id = match conversation_id {
            Some(id) => id,
            None => {
                let conversation = self.repo.create_conversation(Utc::now()).await?;
                info!(conversation_id = %conversation.id, "conversation created");
                conversation.id
            }
        };

        let history = self.history(conversation_id).await?;
        debug!(
            conversation_id = %conversation_id,
            turns = history.len(),
            "history loaded"
        );

        let reply = self.completion.reply(history.messages(), message).await;

        self.repo
            .append_turns(
                conversation_id,
                &[NewTurn::user(message), NewTurn::assistant(reply.clone())],
                Utc::now(),
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ChatError::NotFound(conversation_id),
                other => ChatError::Persistence(other),
            })?;

        info!(conversation_id = %conversation_id, "exchange persisted");

        Ok(ExchangeOutcome {
            reply,
            conversation_id,
        })
    }

    /// Load the ordered history of a conversation.
    pub async fn history(&self, conversation_id: ConversationId) -> Result<History, ChatError> {
        HistoryAssembler::new(&self.repo)
            .assemble(conversation_id)
            .await
    }

    /// List all conversations, newest first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.repo.list_conversations().await?)
    }
}
