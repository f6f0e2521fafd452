//! Secret lookup for the completion API key.
//!
//! The key only ever comes from the environment and is wrapped in a
//! [`SecretString`] as soon as it is read.

pub mod env;
