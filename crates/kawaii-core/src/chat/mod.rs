//! Conversation persistence port and the services built on it.
//!
//! - `repository`: the `ConversationRepository` trait implemented by infra
//! - `history`: rebuilds role-tagged message lists from stored turns
//! - `service`: orchestrates one chat exchange end to end

pub mod history;
pub mod repository;
pub mod service;
