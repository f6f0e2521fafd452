//! Shared domain types for the Kawaii chat relay.
//!
//! Conversations, turns, LLM request/stream shapes, configuration and the
//! error taxonomy shared by every other crate in the workspace.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
