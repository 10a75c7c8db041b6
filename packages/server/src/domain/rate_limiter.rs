//! Admission rate limiter trait.

use std::time::Duration;

use async_trait::async_trait;

use super::ClientAddress;

/// Sliding-window admission control keyed by client address.
///
/// Applied to `CREATE_ROOM` and `JOIN_ROOM` only, never to forwarded frames.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Allow and record the attempt if fewer than `max_events` attempts were
    /// recorded for `address` within the trailing `window`.
    ///
    /// Denied attempts are not recorded.
    async fn check_and_record(
        &self,
        address: &ClientAddress,
        max_events: usize,
        window: Duration,
    ) -> bool;
}
