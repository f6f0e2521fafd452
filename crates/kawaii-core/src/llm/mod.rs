//! LLM provider abstractions.
//!
//! - `LlmProvider`: trait for concrete streaming provider implementations
//! - `CompletionClient`: persona, generation parameters and the
//!   degrade-gracefully reply policy on top of a provider

pub mod completion;
pub mod provider;
