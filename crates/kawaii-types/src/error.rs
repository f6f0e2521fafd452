use thiserror::Error;

use crate::chat::ConversationId;
use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in kawaii-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by a chat exchange or a history lookup.
///
/// The HTTP layer maps each variant to a status code in one place.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Bad or missing input from the caller.
    #[error("{0}")]
    Validation(String),

    /// The requested conversation does not exist.
    #[error("conversation {0} not found")]
    NotFound(ConversationId),

    /// Completion provider failure. The completion client absorbs these into
    /// its fallback reply, so this only appears when a provider is called
    /// directly.
    #[error("upstream provider failure: {0}")]
    Upstream(#[from] LlmError),

    /// Storage failure while reading or writing conversations.
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_chat_error_not_found_display() {
        let err = ChatError::NotFound(ConversationId(9));
        assert_eq!(err.to_string(), "conversation 9 not found");
    }

    #[test]
    fn test_chat_error_from_repository_error() {
        let err: ChatError = RepositoryError::Connection.into();
        assert!(matches!(err, ChatError::Persistence(RepositoryError::Connection)));
    }
}
