//! UseCase: 期限切れ・孤立ルームの回収処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ReapRoomsUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：TTL を過ぎた待機中ルームの回収と送信者への timeout 通知
//! - 正常系：ペア済みルームは TTL の対象外
//! - エッジケース：切断済みのセッションだけが残った孤立ルームの回収

use std::{sync::Arc, time::Duration};

use kakehashi_shared::time::Clock;

use crate::domain::{MessagePusher, Notification, RelayError, Room, RoomRepository};

/// 1 回の走査の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapSummary {
    /// TTL を過ぎて閉じた待機中ルームの数
    pub expired: usize,
    /// 参加者に到達できなくなって閉じたルームの数
    pub orphaned: usize,
}

impl ReapSummary {
    pub fn total(&self) -> usize {
        self.expired + self.orphaned
    }
}

/// ルーム回収のユースケース
pub struct ReapRoomsUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    room_ttl: Duration,
}

impl ReapRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        room_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            room_ttl,
        }
    }

    /// Registry を 1 回走査して回収する
    pub async fn execute(&self) -> ReapSummary {
        let now = self.clock.now();
        let mut summary = ReapSummary::default();

        for room in self.repository.list_rooms().await {
            if room.is_expired(now, self.room_ttl) {
                if self.expire(&room).await {
                    summary.expired += 1;
                }
            } else if self.is_orphaned(&room).await && self.release_orphan(&room).await {
                summary.orphaned += 1;
            }
        }

        if summary.total() > 0 {
            tracing::info!(
                "Reaped {} expired and {} orphaned rooms",
                summary.expired,
                summary.orphaned
            );
        }
        summary
    }

    /// 期限切れの待機中ルームを閉じ、送信者にペアリングのタイムアウトを通知する
    async fn expire(&self, room: &Room) -> bool {
        let Some(sender) = room.sender() else {
            return false;
        };
        let Some(closed) = self.repository.close_room(&room.id, sender).await else {
            return false;
        };
        tracing::info!("Room '{}' expired before a peer joined", closed.id);

        if self.message_pusher.is_connected(&closed.sender).await {
            if let Err(e) = self
                .message_pusher
                .push_notification(
                    &closed.sender,
                    Notification::Rejected(RelayError::PairingTimeout),
                )
                .await
            {
                tracing::debug!("Timeout not delivered to '{}': {}", closed.sender, e);
            }
            self.message_pusher.close(&closed.sender).await;
        }
        true
    }

    /// いずれかの参加者の接続が既に失われているか
    async fn is_orphaned(&self, room: &Room) -> bool {
        let participants = room.sender().into_iter().chain(room.receiver());
        for peer in participants {
            if !self.message_pusher.is_connected(peer).await {
                return true;
            }
        }
        false
    }

    /// 切断イベントなしに参加者が消えたルームを閉じ、残った側を解放する
    async fn release_orphan(&self, room: &Room) -> bool {
        let Some(sender) = room.sender() else {
            return false;
        };
        let Some(closed) = self.repository.close_room(&room.id, sender).await else {
            return false;
        };
        tracing::warn!("Room '{}' orphaned; closing", closed.id);

        let survivors = std::iter::once(&closed.sender).chain(closed.receiver.as_ref());
        for peer in survivors {
            if !self.message_pusher.is_connected(peer).await {
                continue;
            }
            if closed.receiver.is_some() {
                if let Err(e) = self
                    .message_pusher
                    .push_notification(peer, Notification::PeerDisconnected)
                    .await
                {
                    tracing::debug!("PEER_DISCONNECTED not delivered to '{}': {}", peer, e);
                }
            }
            self.message_pusher.close(peer).await;
        }
        true
    }
}
