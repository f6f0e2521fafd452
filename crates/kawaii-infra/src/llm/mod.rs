//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `kawaii-core`, plus [`create_provider`] which builds the configured one.
//!
//! [`LlmProvider`]: kawaii_core::llm::provider::LlmProvider

pub mod openai_compat;

use std::sync::Arc;

use secrecy::SecretString;

use kawaii_core::llm::provider::SharedLlmProvider;
use kawaii_types::config::CompletionConfig;

use self::openai_compat::OpenAiCompatibleProvider;

/// Create the completion provider described by `config`.
pub fn create_provider(config: &CompletionConfig, api_key: &SecretString) -> SharedLlmProvider {
    tracing::info!(
        provider = %config.provider_name,
        base_url = %config.base_url,
        model = %config.model,
        "completion provider configured"
    );
    Arc::new(OpenAiCompatibleProvider::new(
        config.provider_name.clone(),
        &config.base_url,
        api_key,
        config.model.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_uses_configured_name() {
        let config = CompletionConfig {
            provider_name: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            ..CompletionConfig::default()
        };
        let provider = create_provider(&config, &SecretString::from("sk-test".to_string()));
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_provider_defaults_to_groq() {
        let provider = create_provider(
            &CompletionConfig::default(),
            &SecretString::from("gsk-test".to_string()),
        );
        assert_eq!(provider.name(), "groq");
    }
}
