//! UseCase: リレーの状態取得処理

use std::{sync::Arc, time::Duration};

use kakehashi_shared::time::Clock;

use crate::domain::{MessagePusher, RoomRepository};

/// ある時点でのリレーの集計値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayStats {
    pub awaiting_rooms: usize,
    pub paired_rooms: usize,
    pub connected_peers: usize,
    /// プロセスの起動時刻（Unix エポックからのミリ秒）
    pub started_at_millis: i64,
}

/// リレー状態取得のユースケース
pub struct GetRelayStatsUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    room_ttl: Duration,
    started_at_millis: i64,
}

impl GetRelayStatsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        room_ttl: Duration,
        started_at_millis: i64,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            room_ttl,
            started_at_millis,
        }
    }

    /// 集計を実行
    ///
    /// 期限切れで Reaper の回収待ちのルームは、参加できないため数えない。
    pub async fn execute(&self) -> RelayStats {
        let now = self.clock.now();
        let rooms = self.repository.list_rooms().await;
        let live = rooms
            .iter()
            .filter(|room| !room.is_expired(now, self.room_ttl));

        let (mut awaiting_rooms, mut paired_rooms) = (0, 0);
        for room in live {
            if room.is_paired() {
                paired_rooms += 1;
            } else if room.is_awaiting() {
                awaiting_rooms += 1;
            }
        }

        RelayStats {
            awaiting_rooms,
            paired_rooms,
            connected_peers: self.message_pusher.count_connected().await,
            started_at_millis: self.started_at_millis,
        }
    }
}
