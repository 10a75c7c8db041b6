//! Kakehashi relay server.
//!
//! Pairs two WebSocket peers through a short room id and forwards every frame
//! between them verbatim.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kakehashi-server
//! cargo run --bin kakehashi-server -- --host 127.0.0.1 --port 9784 --room-ttl 600
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use kakehashi_server::{
    config::{
        DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_ROOMS, DEFAULT_RATE_LIMIT_MAX,
        DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_REAP_INTERVAL_SECS, DEFAULT_ROOM_TTL_SECS,
        RelayConfig,
    },
    ui::Server,
};
use kakehashi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "kakehashi-server")]
#[command(about = "Rendezvous-and-forward WebSocket relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "RELAY_PORT", default_value_t = 9784)]
    port: u16,

    /// Maximum number of concurrent rooms
    #[arg(long, env = "RELAY_MAX_ROOMS", default_value_t = DEFAULT_MAX_ROOMS)]
    max_rooms: usize,

    /// Seconds a room may wait for its receiver
    #[arg(long, env = "RELAY_ROOM_TTL", default_value_t = DEFAULT_ROOM_TTL_SECS)]
    room_ttl: u64,

    /// Largest relayed frame, in bytes
    #[arg(long, env = "RELAY_MAX_MSG_SIZE", default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_msg_size: usize,

    /// Room create/join attempts allowed per address within the window
    #[arg(long, env = "RELAY_RATE_LIMIT_MAX", default_value_t = DEFAULT_RATE_LIMIT_MAX)]
    rate_limit_max: usize,

    /// Rate limit window, in seconds
    #[arg(long, env = "RELAY_RATE_LIMIT_WINDOW", default_value_t = DEFAULT_RATE_LIMIT_WINDOW_SECS)]
    rate_limit_window: u64,

    /// Seconds between reaper sweeps
    #[arg(long, env = "RELAY_REAP_INTERVAL", default_value_t = DEFAULT_REAP_INTERVAL_SECS)]
    reap_interval: u64,

    /// Use the first address in X-Forwarded-For as the client address
    #[arg(long, env = "RELAY_TRUST_FORWARDED_FOR")]
    trust_forwarded_for: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            max_rooms: self.max_rooms,
            room_ttl: Duration::from_secs(self.room_ttl),
            max_message_size: self.max_msg_size,
            rate_limit_max: self.rate_limit_max,
            rate_limit_window: Duration::from_secs(self.rate_limit_window),
            reap_interval: Duration::from_secs(self.reap_interval),
            trust_forwarded_for: self.trust_forwarded_for,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_BIN_NAME"), "kakehashi_shared", "tower_http"],
        &args.log_level,
    );

    let config = args.relay_config();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Relay configuration: {:?}", config);

    let server = Server::from_config(&config, Arc::new(SystemClock));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
