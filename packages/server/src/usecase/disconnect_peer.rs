//! UseCase: ピア切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectPeerUseCase::execute() メソッド
//! - 相手への PEER_DISCONNECTED 通知とルームの解放
//!
//! ### どのような状況を想定しているか
//! - 正常系：ペア済みの受信者・送信者の切断
//! - エッジケース：双方がほぼ同時に切断した場合、待機中の送信者の切断

use std::sync::Arc;

use crate::domain::{MessagePusher, Notification, PeerId, RoomRepository, Session, SessionState};

/// ピア切断のユースケース
pub struct DisconnectPeerUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectPeerUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ピア切断を実行
    ///
    /// ルームを閉じた呼び出しだけが相手に `PEER_DISCONNECTED` を送り、相手の接続を閉じる。
    /// 通知した相手の PeerId を返す。
    pub async fn execute(&self, session: &mut Session) -> Option<PeerId> {
        let previous = session.close();
        let peer_id = session.peer_id().clone();
        self.message_pusher.unregister_client(&peer_id).await;

        let room_id = match previous {
            SessionState::AwaitingPeer { room_id } | SessionState::Paired { room_id, .. } => room_id,
            SessionState::Connected | SessionState::Closed => {
                tracing::info!("Peer '{}' disconnected", peer_id);
                return None;
            }
        };

        let Some(closed) = self.repository.close_room(&room_id, &peer_id).await else {
            tracing::info!(
                "Peer '{}' disconnected; room '{}' already closed",
                peer_id,
                room_id
            );
            return None;
        };
        tracing::info!("Peer '{}' disconnected; room '{}' closed", peer_id, room_id);

        let counterpart = closed.counterpart_of(&peer_id)?.clone();
        if let Err(e) = self
            .message_pusher
            .push_notification(&counterpart, Notification::PeerDisconnected)
            .await
        {
            tracing::debug!("PEER_DISCONNECTED not delivered to '{}': {}", counterpart, e);
        }
        self.message_pusher.close(&counterpart).await;
        Some(counterpart)
    }
}
