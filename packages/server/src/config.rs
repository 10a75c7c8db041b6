//! Relay configuration values consumed by the core.

use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::repository::RegistrySettings;

pub const DEFAULT_MAX_ROOMS: usize = 1000;
pub const DEFAULT_ROOM_TTL_SECS: u64 = 1800;
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_RATE_LIMIT_MAX: usize = 20;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_REAP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Per-address admission limit for `CREATE_ROOM` / `JOIN_ROOM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_events: usize,
    pub window: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Maximum concurrent rooms
    pub max_rooms: usize,
    /// How long a room may wait for its receiver
    pub room_ttl: Duration,
    /// Largest frame relayed, in bytes
    pub max_message_size: usize,
    pub rate_limit_max: usize,
    pub rate_limit_window: Duration,
    /// Period of the expired-room sweep
    pub reap_interval: Duration,
    /// Take the client address from `X-Forwarded-For` (behind a reverse proxy)
    pub trust_forwarded_for: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_rooms: DEFAULT_MAX_ROOMS,
            room_ttl: Duration::from_secs(DEFAULT_ROOM_TTL_SECS),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            reap_interval: Duration::from_secs(DEFAULT_REAP_INTERVAL_SECS),
            trust_forwarded_for: false,
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rooms == 0 {
            return Err(ConfigError::Zero("max_rooms"));
        }
        if self.room_ttl.is_zero() {
            return Err(ConfigError::Zero("room_ttl"));
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::Zero("max_message_size"));
        }
        if self.rate_limit_max == 0 {
            return Err(ConfigError::Zero("rate_limit_max"));
        }
        if self.rate_limit_window.is_zero() {
            return Err(ConfigError::Zero("rate_limit_window"));
        }
        if self.reap_interval.is_zero() {
            return Err(ConfigError::Zero("reap_interval"));
        }
        Ok(())
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            max_rooms: self.max_rooms,
            room_ttl: self.room_ttl,
        }
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_events: self.rate_limit_max,
            window: self.rate_limit_window,
        }
    }
}
