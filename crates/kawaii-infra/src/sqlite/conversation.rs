//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `kawaii-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, reads on the
//! reader pool and every write on the single writer connection.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use kawaii_core::chat::repository::ConversationRepository;
use kawaii_types::chat::{
    Author, Conversation, ConversationId, ConversationSummary, NewTurn, Turn,
};
use kawaii_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationRepository`.
#[derive(Clone)]
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: i64,
    created_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        Ok(Conversation {
            id: ConversationId(self.id),
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct SummaryRow {
    id: i64,
    created_at: String,
    turn_count: i64,
}

impl SummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            turn_count: row.try_get("turn_count")?,
        })
    }

    fn into_summary(self) -> Result<ConversationSummary, RepositoryError> {
        Ok(ConversationSummary {
            id: ConversationId(self.id),
            created_at: parse_datetime(&self.created_at)?,
            turn_count: self.turn_count as u32,
        })
    }
}

struct TurnRow {
    id: i64,
    conversation_id: i64,
    content: String,
    is_user: bool,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            content: row.try_get("content")?,
            is_user: row.try_get("is_user")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        Ok(Turn {
            id: self.id,
            conversation_id: ConversationId(self.conversation_id),
            author: Author::from_is_user(self.is_user),
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC form so that text comparison in SQL is chronological.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(
        &self,
        created_at: DateTime<Utc>,
    ) -> Result<Conversation, RepositoryError> {
        let created_at_str = format_datetime(&created_at);
        let result = sqlx::query("INSERT INTO conversations (created_at) VALUES (?)")
            .bind(&created_at_str)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(Conversation {
            id: ConversationId(result.last_insert_rowid()),
            created_at: parse_datetime(&created_at_str)?,
        })
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT id, created_at FROM conversations WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let conversation_row = ConversationRow::from_row(&row).map_err(query_error)?;
                Ok(Some(conversation_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.created_at, COUNT(t.id) AS turn_count
               FROM conversations c
               LEFT JOIN turns t ON t.conversation_id = c.id
               GROUP BY c.id
               ORDER BY c.created_at DESC, c.id DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let summary_row = SummaryRow::from_row(row).map_err(query_error)?;
            summaries.push(summary_row.into_summary()?);
        }

        Ok(summaries)
    }

    async fn list_turns(&self, id: ConversationId) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, content, is_user, created_at FROM turns WHERE conversation_id = ? ORDER BY id ASC",
        )
        .bind(id.0)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row = TurnRow::from_row(row).map_err(query_error)?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(turns)
    }

    async fn append_turns(
        &self,
        id: ConversationId,
        turns: &[NewTurn],
        created_at: DateTime<Utc>,
    ) -> Result<Vec<Turn>, RepositoryError> {
        let created_at_str = format_datetime(&created_at);
        let stored_at = parse_datetime(&created_at_str)?;

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let exists = sqlx::query("SELECT 1 FROM conversations WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let mut stored = Vec::with_capacity(turns.len());
        for turn in turns {
            let result = sqlx::query(
                "INSERT INTO turns (conversation_id, content, is_user, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(id.0)
            .bind(&turn.content)
            .bind(turn.author.is_user())
            .bind(&created_at_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.message().contains("FOREIGN KEY") {
                        return RepositoryError::NotFound;
                    }
                }
                query_error(e)
            })?;

            stored.push(Turn {
                id: result.last_insert_rowid(),
                conversation_id: id,
                author: turn.author,
                content: turn.content.clone(),
                created_at: stored_at,
            });
        }

        tx.commit().await.map_err(query_error)?;

        Ok(stored)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        // Turns follow through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM conversations WHERE created_at < ?")
            .bind(format_datetime(&cutoff))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        Ok(result.rows_affected())
    }
}
