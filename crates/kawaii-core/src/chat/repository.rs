//! ConversationRepository trait definition.
//!
//! Every method is one logical, atomic operation against the store. Uses
//! native async fn in traits (RPITIT, Rust 2024 edition).

use chrono::{DateTime, Utc};
use kawaii_types::chat::{Conversation, ConversationId, ConversationSummary, NewTurn, Turn};
use kawaii_types::error::RepositoryError;

/// Repository trait for conversation and turn persistence.
///
/// Implementations live in kawaii-infra (e.g., `SqliteConversationRepository`).
pub trait ConversationRepository: Send + Sync {
    /// Create an empty conversation. Ids are strictly increasing.
    fn create_conversation(
        &self,
        created_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Get a conversation by id.
    fn get_conversation(
        &self,
        id: ConversationId,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List every conversation, newest first.
    fn list_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationSummary>, RepositoryError>> + Send;

    /// All turns of a conversation in insertion (chronological) order.
    fn list_turns(
        &self,
        id: ConversationId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Append turns to a conversation in a single transaction.
    ///
    /// Either every turn is stored or none is. Returns
    /// `RepositoryError::NotFound` if the conversation does not exist.
    fn append_turns(
        &self,
        id: ConversationId,
        turns: &[NewTurn],
        created_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Delete every conversation created strictly before `cutoff`, along with
    /// its turns. Returns the number of conversations removed.
    fn delete_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
