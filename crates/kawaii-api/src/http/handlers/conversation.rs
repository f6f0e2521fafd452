//! Conversation read endpoints.
//!
//! Endpoints:
//! - GET /api/chat/{chat_id} - Turns of one conversation, oldest first
//! - GET /api/chats          - Every conversation, newest first

use axum::Json;
use axum::extract::{Path, State};
use chrono::SecondsFormat;
use serde::Serialize;

use kawaii_types::chat::ConversationId;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TurnView {
    pub content: String,
    pub is_user: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<TurnView>,
}

#[derive(Debug, Serialize)]
pub struct ChatSummaryView {
    pub id: ConversationId,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatSummaryView>,
}

/// GET /api/chat/{chat_id} - Read one conversation.
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    // Non-integer ids never match a chat.
    let id: ConversationId = chat_id.parse().map_err(|_| AppError::ChatNotFound)?;

    let history = state.chat_service.history(id).await?;

    Ok(Json(HistoryResponse {
        messages: history
            .turns()
            .iter()
            .map(|turn| TurnView {
                content: turn.content.clone(),
                is_user: turn.author.is_user(),
            })
            .collect(),
    }))
}

/// GET /api/chats - List conversations.
pub async fn list_chats(State(state): State<AppState>) -> Result<Json<ChatListResponse>, AppError> {
    let conversations = state.chat_service.list_conversations().await?;

    Ok(Json(ChatListResponse {
        chats: conversations
            .into_iter()
            .map(|c| ChatSummaryView {
                id: c.id,
                created_at: c.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            })
            .collect(),
    }))
}
