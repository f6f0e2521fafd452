//! HTTP request handlers for the JSON API.

pub mod chat;
pub mod conversation;
