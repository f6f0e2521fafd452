//! Completion client with a degrade-gracefully failure policy.
//!
//! Wraps a [`SharedLlmProvider`] with the persona instruction and fixed
//! generation parameters. The provider's token stream is drained eagerly into
//! one reply; provider failures are logged and replaced by a fixed apology so
//! the chat never breaks on upstream errors.

use std::time::Instant;

use futures_util::StreamExt;
use tracing::{debug, error, warn};

use kawaii_types::config::{CompletionConfig, PersonaConfig};
use kawaii_types::llm::{CompletionRequest, LlmError, Message, StreamEvent};

use super::provider::SharedLlmProvider;

/// Fixed per-deployment generation settings.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub fallback_reply: String,
}

impl CompletionSettings {
    pub fn from_config(completion: &CompletionConfig, persona: &PersonaConfig) -> Self {
        Self {
            model: completion.model.clone(),
            temperature: completion.temperature,
            top_p: completion.top_p,
            max_tokens: completion.max_tokens,
            system_prompt: persona.system_prompt.clone(),
            fallback_reply: persona.fallback_reply.clone(),
        }
    }
}

/// Produces one assistant reply per call; never returns an error.
pub struct CompletionClient {
    provider: SharedLlmProvider,
    settings: CompletionSettings,
}

impl CompletionClient {
    pub fn new(provider: SharedLlmProvider, settings: CompletionSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Build the streaming request: history first, then the new user message.
    pub fn build_request(
        &self,
        history: impl IntoIterator<Item = Message>,
        user_message: &str,
    ) -> CompletionRequest {
        let mut messages: Vec<Message> = history.into_iter().collect();
        messages.push(Message::user(user_message));

        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(self.settings.system_prompt.clone()),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            top_p: Some(self.settings.top_p),
            stream: true,
        }
    }

    /// Generate the assistant's reply to `user_message`.
    ///
    /// Any provider failure, or a reply that is empty after trimming, yields
    /// the configured fallback text instead.
    pub async fn reply(
        &self,
        history: impl IntoIterator<Item = Message>,
        user_message: &str,
    ) -> String {
        let request = self.build_request(history, user_message);
        let start = Instant::now();

        match self.collect(request).await {
            Ok(reply) if !reply.is_empty() => {
                debug!(
                    provider = self.provider.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    chars = reply.len(),
                    "completion received"
                );
                reply
            }
            Ok(_) => {
                warn!(provider = self.provider.name(), "completion was empty, using fallback reply");
                self.settings.fallback_reply.clone()
            }
            Err(e) => {
                error!(provider = self.provider.name(), error = %e, "error creating completion");
                self.settings.fallback_reply.clone()
            }
        }
    }

    /// Drain the provider stream into one trimmed string.
    async fn collect(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let mut stream = self.provider.stream(request);
        let mut reply = String::new();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::TextDelta { text } => reply.push_str(&text),
                StreamEvent::MessageDelta { stop_reason } => {
                    debug!(%stop_reason, "completion finished");
                }
                StreamEvent::Usage(usage) => {
                    debug!(
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "completion usage"
                    );
                }
                StreamEvent::Done => break,
            }
        }

        Ok(reply.trim().to_string())
    }
}
