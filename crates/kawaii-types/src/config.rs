//! Relay configuration types.
//!
//! `RelayConfig` mirrors `config.toml` in the data directory. Every field has
//! a default, so an empty or missing file yields a working relay.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Persona instruction sent as the system message on every completion.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a kawaii shy anime girl. Respond in a cute, shy manner, using anime-style expressions and mannerisms. Use emoticons and occasional Japanese words. Keep responses brief and sweet. Remember information from previous messages in the conversation.";

/// Reply stored and returned whenever the completion provider fails.
pub const DEFAULT_FALLBACK_REPLY: &str =
    "G-gomen nasai... I couldn't process that request. (⌒_⌒;)";

/// Top-level configuration for the relay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    pub persona: PersonaConfig,
    pub retention: RetentionConfig,
    pub rate_limit: RateLimitConfig,
}

/// HTTP listener and static front-end settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html` and a `static/` folder. Relative paths
    /// resolve against the working directory.
    pub web_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            web_dir: PathBuf::from("web"),
        }
    }
}

/// Completion provider settings (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub provider_name: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider_name: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-70b-versatile".to_string(),
            temperature: 1.0,
            top_p: 1.0,
            max_tokens: 1024,
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    pub system_prompt: String,
    pub fallback_reply: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

/// How long conversations are kept and how often the sweep runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub max_age_days: u32,
    pub sweep_interval_hours: u32,
}

impl RetentionConfig {
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_age_days))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.sweep_interval_hours.max(1)) * 3600)
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_days: 7,
            sweep_interval_hours: 24,
        }
    }
}

/// Per-caller request limits. Zero disables a limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Limit on `POST /api/chat`.
    pub chat_per_minute: u32,
    /// Limits shared by every `/api` route.
    pub api_per_hour: u32,
    pub api_per_day: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            chat_per_minute: 10,
            api_per_hour: 50,
            api_per_day: 200,
        }
    }
}
