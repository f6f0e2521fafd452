//! Conversation history assembly.
//!
//! Turns are loaded with one explicit query and replayed as role-tagged
//! messages for the completion provider.

use kawaii_types::chat::{Conversation, ConversationId, Turn};
use kawaii_types::error::ChatError;
use kawaii_types::llm::Message;

use crate::chat::repository::ConversationRepository;

/// Stored turns of one conversation, in chronological order.
#[derive(Debug, Clone)]
pub struct History {
    conversation: Conversation,
    turns: Vec<Turn>,
}

impl History {
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Role-tagged messages, one per turn.
    ///
    /// Each call starts a fresh pass over the same turns.
    pub fn messages(&self) -> impl Iterator<Item = Message> + '_ {
        self.turns.iter().map(|turn| Message {
            role: turn.author.role(),
            content: turn.content.clone(),
        })
    }
}

/// Rebuilds [`History`] values from a [`ConversationRepository`].
pub struct HistoryAssembler<'a, C: ConversationRepository> {
    repo: &'a C,
}

impl<'a, C: ConversationRepository> HistoryAssembler<'a, C> {
    pub fn new(repo: &'a C) -> Self {
        Self { repo }
    }

    /// Load the history of `id`.
    ///
    /// Fails with [`ChatError::NotFound`] if the conversation does not exist.
    pub async fn assemble(&self, id: ConversationId) -> Result<History, ChatError> {
        let conversation = self
            .repo
            .get_conversation(id)
            .await?
            .ok_or(ChatError::NotFound(id))?;

        let turns = self.repo.list_turns(id).await?;

        Ok(History {
            conversation,
            turns,
        })
    }
}
