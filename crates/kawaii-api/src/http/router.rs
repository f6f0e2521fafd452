//! Axum router configuration with middleware.
//!
//! JSON routes live under `/api`. The read routes share the default
//! per-caller limits; `POST /api/chat` carries only its own limit. `/` and
//! `/static/*` serve the web front-end from the configured directory.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::http::rate_limit::{api_rate_limit, chat_rate_limit};
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The chat limit replaces the defaults on this route.
    let chat_route = post(handlers::chat::post_chat)
        .route_layer(from_fn_with_state(state.clone(), chat_rate_limit));

    let read_routes = Router::new()
        .route("/chat/{chat_id}", get(handlers::conversation::get_chat))
        .route("/chats", get(handlers::conversation::list_chats))
        .route_layer(from_fn_with_state(state.clone(), api_rate_limit));

    let api_routes = Router::new().route("/chat", chat_route).merge(read_routes);

    let web_dir = &state.config.server.web_dir;
    if !web_dir.join("index.html").exists() {
        tracing::warn!(path = %web_dir.display(), "web front-end not found; only the API is served");
    }

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .route_service("/", ServeFile::new(web_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(web_dir.join("static")))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check, never rate limited.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use kawaii_core::llm::provider::{LlmEventStream, LlmProvider, SharedLlmProvider};
    use kawaii_infra::sqlite::pool::DatabasePool;
    use kawaii_types::config::{DEFAULT_FALLBACK_REPLY, RelayConfig};
    use kawaii_types::llm::{CompletionRequest, LlmError, StreamEvent};

    use super::*;

    /// Replies with fixed text, or fails when `reply` is `None`.
    struct FixedProvider {
        reply: Option<&'static str>,
    }

    impl LlmProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn stream(&self, _request: CompletionRequest) -> LlmEventStream {
            let events = match self.reply {
                Some(text) => vec![
                    Ok(StreamEvent::TextDelta {
                        text: text.to_string(),
                    }),
                    Ok(StreamEvent::Done),
                ],
                None => vec![Err(LlmError::Provider {
                    message: "upstream unavailable".to_string(),
                })],
            };
            Box::pin(futures_util::stream::iter(events))
        }
    }

    async fn test_app(provider: SharedLlmProvider) -> Router {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let pool = DatabasePool::open_in(&path).await.unwrap();
        let mut config = RelayConfig::default();
        config.server.web_dir = path.join("web");
        build_router(AppState::new(pool, provider, config))
    }

    async fn replying_app() -> Router {
        test_app(Arc::new(FixedProvider {
            reply: Some("Konnichiwa~ (*^_^*)"),
        }))
        .await
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = replying_app().await;
        let (status, _, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_new_chat_then_history() {
        let app = replying_app().await;

        let (status, headers, body) =
            send(&app, post_json("/api/chat", r#"{"message":"hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Konnichiwa~ (*^_^*)");
        assert_eq!(headers["X-RateLimit-Limit"], "10");
        assert_eq!(headers["X-RateLimit-Remaining"], "9");
        let chat_id = body["chat_id"].as_i64().unwrap();

        let (status, _, body) = send(&app, get(&format!("/api/chat/{chat_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "messages": [
                    { "content": "hello", "is_user": true },
                    { "content": "Konnichiwa~ (*^_^*)", "is_user": false },
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_continue_existing_chat() {
        let app = replying_app().await;
        let (_, _, first) = send(&app, post_json("/api/chat", r#"{"message":"hi"}"#)).await;
        let chat_id = first["chat_id"].as_i64().unwrap();

        let body = format!(r#"{{"message":"how are you","chat_id":"{chat_id}"}}"#);
        let (status, _, second) = send(&app, post_json("/api/chat", &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["chat_id"].as_i64(), Some(chat_id));

        let (_, _, history) = send(&app, get(&format!("/api/chat/{chat_id}"))).await;
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[2]["content"], "how are you");
        assert_eq!(messages[2]["is_user"], true);
        assert_eq!(messages[3]["is_user"], false);
    }

    #[tokio::test]
    async fn test_invalid_bodies_create_nothing() {
        let app = replying_app().await;

        let (status, _, body) = send(&app, post_json("/api/chat", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid request data" }));

        let (status, _, body) = send(&app, post_json("/api/chat", r#"{"message":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No message provided" }));

        let (status, _, body) = send(&app, post_json("/api/chat", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid request data" }));

        let (_, _, chats) = send(&app, get("/api/chats")).await;
        assert_eq!(chats, json!({ "chats": [] }));
    }

    #[tokio::test]
    async fn test_unknown_chat_is_not_found() {
        let app = replying_app().await;

        let (status, _, body) = send(
            &app,
            post_json("/api/chat", r#"{"message":"hi","chat_id":999}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _, _) = send(&app, get("/api/chat/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = send(&app, get("/api/chat/abc")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Chat not found" }));
    }

    #[tokio::test]
    async fn test_provider_failure_returns_fallback() {
        let app = test_app(Arc::new(FixedProvider { reply: None })).await;

        let (status, _, body) = send(&app, post_json("/api/chat", r#"{"message":"hi"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], DEFAULT_FALLBACK_REPLY);

        let chat_id = body["chat_id"].as_i64().unwrap();
        let (_, _, history) = send(&app, get(&format!("/api/chat/{chat_id}"))).await;
        assert_eq!(history["messages"][1]["content"], DEFAULT_FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_list_chats_newest_first() {
        let app = replying_app().await;
        let (_, _, first) = send(&app, post_json("/api/chat", r#"{"message":"one"}"#)).await;
        let (_, _, second) = send(&app, post_json("/api/chat", r#"{"message":"two"}"#)).await;

        let (status, _, body) = send(&app, get("/api/chats")).await;
        assert_eq!(status, StatusCode::OK);
        let chats = body["chats"].as_array().unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0]["id"], second["chat_id"]);
        assert_eq!(chats[1]["id"], first["chat_id"]);
        assert!(chats[0]["created_at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_eleventh_chat_in_a_minute_is_throttled() {
        let app = replying_app().await;

        for _ in 0..10 {
            let (status, _, _) = send(&app, post_json("/api/chat", r#"{"message":"hi"}"#)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, headers, body) =
            send(&app, post_json("/api/chat", r#"{"message":"hi"}"#)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].as_str().unwrap().contains("Rate limit exceeded"));
        assert!(headers.contains_key("Retry-After"));
        assert_eq!(headers["X-RateLimit-Remaining"], "0");

        // Read routes and the health check are unaffected.
        let (status, _, _) = send(&app, get("/api/chats")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_front_end_is_not_found() {
        let app = replying_app().await;
        let (status, _, _) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_calls_do_not_spend_read_limits() {
        let app = replying_app().await;

        // The 11th chat is throttled by the per-minute chat limit.
        for _ in 0..11 {
            send(&app, post_json("/api/chat", r#"{"message":"hi"}"#)).await;
        }

        // None of those count toward the 50/hour read limit.
        for i in 0..50 {
            let (status, _, _) = send(&app, get("/api/chats")).await;
            assert_eq!(status, StatusCode::OK, "read request {} was throttled", i + 1);
        }

        let (status, headers, body) = send(&app, get("/api/chats")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(headers["X-RateLimit-Limit"], "50");
        assert_eq!(body, json!({ "error": "Rate limit exceeded: 50 per 1 hour" }));
    }
}
