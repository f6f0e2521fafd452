//! Conversation and turn types.
//!
//! A conversation is an ordered, append-only list of turns. Turns are
//! authored either by the user or by the assistant and never change once
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::llm::MessageRole;

/// Identifier of a stored conversation.
///
/// Backed by SQLite's `AUTOINCREMENT` rowid, so ids are strictly increasing
/// and never reused, even after the retention sweep deletes old rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Who wrote a turn.
///
/// Persisted as the `is_user` boolean column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

impl Author {
    pub fn from_is_user(is_user: bool) -> Self {
        if is_user { Author::User } else { Author::Assistant }
    }

    pub fn is_user(self) -> bool {
        matches!(self, Author::User)
    }

    /// Role tag used when replaying this turn to the completion provider.
    pub fn role(self) -> MessageRole {
        match self {
            Author::User => MessageRole::User,
            Author::Assistant => MessageRole::Assistant,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Assistant => write!(f, "assistant"),
        }
    }
}

/// A persisted chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub created_at: DateTime<Utc>,
}

/// Listing row for a conversation, with its turn count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub created_at: DateTime<Utc>,
    pub turn_count: u32,
}

/// One message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub conversation_id: ConversationId,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A turn that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTurn {
    pub author: Author,
    pub content: String,
}

impl NewTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            author: Author::Assistant,
            content: content.into(),
        }
    }
}
