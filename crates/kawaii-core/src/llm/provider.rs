//! LlmProvider trait definition.
//!
//! This is the core abstraction that completion providers implement. The
//! stream is boxed so the trait stays object-safe and a provider can be
//! shared as `Arc<dyn LlmProvider>`.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;

use kawaii_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Boxed stream of provider events.
pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Type-erased provider handle, chosen at startup.
pub type SharedLlmProvider = Arc<dyn LlmProvider>;

/// Trait for streaming completion backends (Groq, OpenAI, etc.).
///
/// Implementations live in kawaii-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Send a streaming completion request. Returns a stream of events.
    ///
    /// Request-building failures are reported as the stream's first item.
    fn stream(&self, request: CompletionRequest) -> LlmEventStream;
}
