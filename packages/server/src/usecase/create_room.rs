//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//! - レート制限、容量制限、セッションの状態遷移
//!
//! ### どのような状況を想定しているか
//! - 正常系：未ペアのセッションからの CREATE_ROOM
//! - 異常系：レート制限超過、Registry の容量超過
//! - エッジケース：既にルームに属するセッションからの CREATE_ROOM

use std::sync::Arc;

use crate::{
    config::RateLimitPolicy,
    domain::{
        MessagePusher, Notification, RateLimiter, RelayError, RoomId, RoomRepository, Session,
        SessionState,
    },
};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// RateLimiter（アドレスごとの受付制限）
    rate_limiter: Arc<dyn RateLimiter>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    policy: RateLimitPolicy,
}

impl CreateRoomUseCase {
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

    /// ルーム作成を実行
    ///
    /// 成功時はセッションを送信者として `AwaitingPeer` に遷移させ、
    /// `ROOM_CREATED` を返信する。失敗時はセッションの状態を変更しない。
    pub async fn execute(&self, session: &mut Session) -> Result<RoomId, RelayError> {
        if session.state() != &SessionState::Connected {
            return Err(RelayError::InvalidRequest);
        }

        if !self
            .rate_limiter
            .check_and_record(session.address(), self.policy.max_events, self.policy.window)
            .await
        {
            tracing::warn!("CREATE_ROOM from {} rate limited", session.address());
            return Err(RelayError::RateLimited);
        }

        let room = self
            .repository
            .create_room(session.peer_id().clone())
            .await
            .inspect_err(|e| tracing::warn!("CREATE_ROOM from {} rejected: {}", session.address(), e))?;

        if session.await_peer(room.id.clone()).is_err() {
            self.repository.close_room(&room.id, session.peer_id()).await;
            return Err(RelayError::InvalidRequest);
        }

        if let Err(e) = self
            .message_pusher
            .push_notification(session.peer_id(), Notification::RoomCreated(room.id.clone()))
            .await
        {
            tracing::warn!("Failed to send ROOM_CREATED to '{}': {}", session.peer_id(), e);
        }

        tracing::info!("Room '{}' created by '{}'", room.id, session.peer_id());
        Ok(room.id)
    }
}
