//! Business logic and repository trait definitions for the Kawaii chat relay.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements, plus the services built on top of them:
//! history assembly, the completion client, the chat exchange and the
//! retention sweep. It depends only on `kawaii-types` -- never on
//! `kawaii-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod retention;

#[cfg(test)]
pub(crate) mod testing;
