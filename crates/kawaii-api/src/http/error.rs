//! Application error type mapping to HTTP status codes and `{error}` bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use kawaii_types::error::ChatError;

/// Body text for every 5xx response; details only go to the log.
pub const GENERIC_ERROR: &str = "An unexpected error occurred";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the chat service.
    Chat(ChatError),
    /// Request that could not be decoded at all.
    BadRequest(String),
    /// Path that cannot name a chat.
    ChatNotFound,
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Chat(ChatError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Chat(ChatError::NotFound(_)) | AppError::ChatNotFound => {
                (StatusCode::NOT_FOUND, "Chat not found".to_string())
            }
            AppError::Chat(ChatError::Upstream(_)) => {
                (StatusCode::BAD_GATEWAY, GENERIC_ERROR.to_string())
            }
            AppError::Chat(ChatError::Persistence(_)) | AppError::Chat(ChatError::Internal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), %message, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
