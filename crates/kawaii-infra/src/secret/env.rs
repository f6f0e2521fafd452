//! Environment variable secret lookup.

use secrecy::SecretString;

use crate::config::ConfigError;

/// Read the API key from the environment variable `name`.
///
/// An unset, empty or non-Unicode variable is a startup error.
pub fn require_api_key(name: &str) -> Result<SecretString, ConfigError> {
    api_key_from(name, std::env::var(name).ok())
}

fn api_key_from(name: &str, value: Option<String>) -> Result<SecretString, ConfigError> {
    match value {
        Some(val) if !val.trim().is_empty() => Ok(SecretString::from(val)),
        _ => Err(ConfigError::MissingEnv(name.to_string())),
    }
}
