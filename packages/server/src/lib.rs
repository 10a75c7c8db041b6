//! Rendezvous-and-forward relay.
//!
//! Two peers connect over WebSocket, meet through a short room id, and are
//! then bridged so every frame one writes is delivered verbatim to the other.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
