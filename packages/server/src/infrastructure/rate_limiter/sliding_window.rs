//! Sliding-window rate limiter keyed by client address.
//!
//! Each address keeps the instants of its recent admitted attempts. Old
//! instants are pruned lazily when the address is checked; every
//! `SWEEP_EVERY` checks the whole table drops addresses with no events left
//! in their window so idle addresses do not accumulate.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use kakehashi_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{ClientAddress, RateLimiter};

const SWEEP_EVERY: u64 = 256;

#[derive(Default)]
struct LimiterTable {
    entries: HashMap<ClientAddress, VecDeque<Instant>>,
    checks: u64,
}

pub struct SlidingWindowRateLimiter {
    table: Mutex<LimiterTable>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(LimiterTable::default()),
            clock,
        }
    }

    /// Number of addresses currently tracked
    pub async fn tracked_addresses(&self) -> usize {
        self.table.lock().await.entries.len()
    }
}

fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = events.front() {
        if now.saturating_duration_since(*oldest) > window {
            events.pop_front();
        } else {
            break;
        }
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn check_and_record(
        &self,
        address: &ClientAddress,
        max_events: usize,
        window: Duration,
    ) -> bool {
        let now = self.clock.now();
        let mut table = self.table.lock().await;

        table.checks += 1;
        if table.checks % SWEEP_EVERY == 0 {
            table.entries.retain(|_, events| {
                events
                    .back()
                    .is_some_and(|newest| now.saturating_duration_since(*newest) <= window)
            });
        }

        let events = table.entries.entry(*address).or_default();
        prune(events, now, window);

        if events.len() >= max_events {
            tracing::debug!("Rate limit hit for {} ({} events)", address, events.len());
            if events.is_empty() {
                table.entries.remove(address);
            }
            return false;
        }

        events.push_back(now);
        true
    }
}
