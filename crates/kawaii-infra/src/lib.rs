//! Infrastructure layer for the Kawaii chat relay.
//!
//! Implementations of the traits defined in `kawaii-core`: SQLite storage,
//! the OpenAI-compatible completion provider, plus configuration and secret
//! loading.

pub mod config;
pub mod llm;
pub mod secret;
pub mod sqlite;
