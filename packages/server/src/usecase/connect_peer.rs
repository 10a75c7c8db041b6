//! UseCase: ピア接続処理

use std::sync::Arc;

use crate::domain::{MessagePusher, PeerChannel, PeerId};

/// ピア接続のユースケース
///
/// 接続直後のピアの送信チャンネルを登録し、他の実行コンテキストから
/// PeerId で到達できるようにする。
pub struct ConnectPeerUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectPeerUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub async fn execute(&self, peer_id: PeerId, channel: PeerChannel) {
        tracing::debug!("Peer '{}' connected", peer_id);
        self.message_pusher.register_client(peer_id, channel).await;
    }
}
