//! Observability setup for the Kawaii chat relay.

pub mod tracing_setup;

pub use tracing_setup::{TracingOptions, default_directive, init_tracing, shutdown_tracing};
