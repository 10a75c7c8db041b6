//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ペアリング成立時の通知（送信者へ PEER_JOINED、参加者へ ROOM_JOINED）
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中のルームへの参加
//! - 異常系：存在しない ID、不正な形式の ID、既にペア済みのルーム、レート制限
//! - エッジケース：送信者への PEER_JOINED 通知が失敗した場合のルーム解放

use std::sync::Arc;

use crate::{
    config::RateLimitPolicy,
    domain::{
        MessagePusher, Notification, RateLimiter, RelayError, RoomId, RoomRepository, Session,
        SessionState,
    },
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// RateLimiter（アドレスごとの受付制限）
    rate_limiter: Arc<dyn RateLimiter>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    policy: RateLimitPolicy,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        rate_limiter: Arc<dyn RateLimiter>,
        message_pusher: Arc<dyn MessagePusher>,
        policy: RateLimitPolicy,
    ) -> Self {
        Self {
            repository,
            rate_limiter,
            message_pusher,
            policy,
        }
    }

    /// ルーム参加を実行
    ///
    /// 待機中の送信者に `PEER_JOINED` を送り、届いた場合にのみ参加者へ `ROOM_JOINED` を返す。
    /// 送信者に届かなかった場合はルームを閉じて `ROOM_NOT_FOUND` だけを返す。
    pub async fn execute(
        &self,
        session: &mut Session,
        room_id: &str,
    ) -> Result<RoomId, RelayError> {
        if session.state() != &SessionState::Connected {
            return Err(RelayError::InvalidRequest);
        }

        if !self
            .rate_limiter
            .check_and_record(session.address(), self.policy.max_events, self.policy.window)
            .await
        {
            tracing::warn!("JOIN_ROOM from {} rate limited", session.address());
            return Err(RelayError::RateLimited);
        }

        // 形式不正の ID は存在しない ID と区別しない
        let room_id = RoomId::new(room_id.to_string()).map_err(|_| RelayError::RoomNotFound)?;

        let room = self
            .repository
            .join_room(&room_id, session.peer_id().clone())
            .await
            .inspect_err(|e| {
                tracing::info!("JOIN_ROOM '{}' from '{}' rejected: {}", room_id, session.peer_id(), e)
            })?;

        let Some(sender) = room.sender().cloned() else {
            return Err(RelayError::RoomNotFound);
        };

        if let Err(e) = self
            .message_pusher
            .push_notification(&sender, Notification::PeerJoined(session.peer_id().clone()))
            .await
        {
            tracing::warn!(
                "Sender '{}' of room '{}' unreachable, closing room: {}",
                sender,
                room_id,
                e
            );
            self.repository.close_room(&room_id, &sender).await;
            self.message_pusher.close(&sender).await;
            return Err(RelayError::RoomNotFound);
        }

        if session
            .pair_as_receiver(room_id.clone(), sender.clone())
            .is_err()
        {
            self.repository.close_room(&room_id, session.peer_id()).await;
            return Err(RelayError::InvalidRequest);
        }

        // 受信者のループは execute が返るまで次のフレームを読まないため、
        // ここで送っても中継フレームが PEER_JOINED を追い越すことはない
        if let Err(e) = self
            .message_pusher
            .push_notification(session.peer_id(), Notification::RoomJoined(room_id.clone()))
            .await
        {
            tracing::warn!("Failed to send ROOM_JOINED to '{}': {}", session.peer_id(), e);
        }

        tracing::info!(
            "Room '{}' paired: sender '{}', receiver '{}'",
            room_id,
            sender,
            session.peer_id()
        );
        Ok(room_id)
    }
}
