//! HTTP layer for the Kawaii chat relay.
//!
//! Axum-based JSON API under `/api`, the static web front-end, per-caller
//! rate limiting and CORS support.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod router;
