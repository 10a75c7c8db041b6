//! Shared utilities for the Kakehashi relay.
//!
//! - `logger`: tracing subscriber setup
//! - `time`: clock abstraction and wall-clock helpers

pub mod logger;
pub mod time;
