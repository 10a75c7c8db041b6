//! Periodic room sweep.
//!
//! The reaper runs as its own task and talks to the rest of the relay only
//! through the room registry and the message pusher.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::usecase::ReapRoomsUseCase;

/// Spawn the reaper, sweeping once every `period`.
///
/// The first sweep runs one full period after start. Abort the returned
/// handle to stop it.
pub fn spawn_reaper(usecase: Arc<ReapRoomsUseCase>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval の最初の tick は即座に完了する
        ticker.tick().await;

        tracing::info!("Reaper started (interval: {:?})", period);
        loop {
            ticker.tick().await;
            let summary = usecase.execute().await;
            tracing::debug!(
                "Reaper sweep finished: {} expired, {} orphaned",
                summary.expired,
                summary.orphaned
            );
        }
    })
}
