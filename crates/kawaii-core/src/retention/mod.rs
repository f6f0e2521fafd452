//! Conversation retention: the sweep itself and its periodic schedule.

pub mod scheduler;
pub mod sweeper;
