//! Relay configuration loader.
//!
//! Reads `config.toml` from the data directory (`./instance/` by default) and
//! deserializes it into [`RelayConfig`]. Falls back to defaults when the file
//! is missing or malformed.

use std::path::{Path, PathBuf};

use kawaii_types::config::RelayConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "KAWAII_DATA_DIR";

/// Data directory used when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "instance";

/// Startup configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingEnv(String),
}

/// Load relay configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`RelayConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> RelayConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            RelayConfig::default()
        }
    }
}

/// Pick the data directory: explicit flag, then `KAWAII_DATA_DIR`, then
/// `./instance`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    choose_data_dir(explicit, std::env::var(DATA_DIR_ENV).ok())
}

fn choose_data_dir(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
    match (explicit, env_value) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(value)) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}
