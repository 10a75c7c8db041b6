//! WebSocket relay server implementation.

mod handler;
mod reaper;
mod server;
mod signal;
pub mod state;

pub use server::Server;
