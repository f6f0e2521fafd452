//! Chat exchange endpoint.
//!
//! POST /api/chat
//!
//! Body `{ "message": "...", "chat_id": 3 }`. Without a `chat_id` (or with
//! `null`/`0`) a new conversation is started. Responds with
//! `{ "response": "...", "chat_id": N }`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Deserializer, Serialize};

use kawaii_types::chat::ConversationId;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// Outer `None`: field absent. `Some(None)`: explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub message: Option<Option<String>>,
    #[serde(default, deserialize_with = "chat_id")]
    pub chat_id: Option<ConversationId>,
}

impl ChatRequest {
    /// Message text as the service sees it; `null` counts as empty.
    fn message_text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .map(|m| m.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub chat_id: ConversationId,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChatId {
    Number(i64),
    Text(String),
}

/// Accept a number or a numeric string. `null`, `0` and `""` mean "new".
fn chat_id<'de, D>(deserializer: D) -> Result<Option<ConversationId>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<RawChatId>::deserialize(deserializer)? {
        None | Some(RawChatId::Number(0)) => Ok(None),
        Some(RawChatId::Number(n)) => Ok(Some(ConversationId(n))),
        Some(RawChatId::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawChatId::Text(s)) => s
            .parse::<ConversationId>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid chat_id {s:?}: {e}"))),
    }
}

/// POST /api/chat - Run one exchange and return the assistant reply.
pub async fn post_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    tracing::info!("Received request to /api/chat");

    let Json(request) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "rejected chat request body");
        AppError::BadRequest("Invalid request data".to_string())
    })?;
    tracing::debug!(?request, "chat request");

    let outcome = state
        .chat_service
        .exchange(request.message_text(), request.chat_id)
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.reply,
        chat_id: outcome.conversation_id,
    }))
}
