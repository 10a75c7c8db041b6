//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `PeerChannel` を PeerId で管理
//! - フレームの中継、制御通知の送信、接続のクローズ
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! 送信先のチャンネルは送信のたびにロック下で検索し、ロックを解放してから
//! 送信します。フレーム送信はバッファに空きができるまで待機するため、
//! ロックを保持したまま待機することはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Frame, MessagePushError, MessagePusher, Notification, PeerChannel, PeerId};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中のピアの送信チャンネル
    clients: Arc<Mutex<HashMap<PeerId, PeerChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<PeerId, PeerChannel>>>) -> Self {
        Self { clients }
    }

    async fn channel_of(&self, peer_id: &PeerId) -> Result<PeerChannel, MessagePushError> {
        let clients = self.clients.lock().await;
        clients
            .get(peer_id)
            .cloned()
            .ok_or_else(|| MessagePushError::PeerNotFound(peer_id.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, peer_id: PeerId, channel: PeerChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Peer '{}' registered to MessagePusher", peer_id);
        clients.insert(peer_id, channel);
    }

    async fn unregister_client(&self, peer_id: &PeerId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(peer_id).is_some() {
            tracing::debug!("Peer '{}' unregistered from MessagePusher", peer_id);
        }
    }

    async fn is_connected(&self, peer_id: &PeerId) -> bool {
        let clients = self.clients.lock().await;
        clients
            .get(peer_id)
            .is_some_and(|channel| !channel.is_closed())
    }

    async fn push_frame(&self, peer_id: &PeerId, frame: Frame) -> Result<(), MessagePushError> {
        let channel = self.channel_of(peer_id).await?;
        channel.deliver(frame).await
    }

    async fn push_notification(
        &self,
        peer_id: &PeerId,
        notification: Notification,
    ) -> Result<(), MessagePushError> {
        let channel = self.channel_of(peer_id).await?;
        channel.notify(notification)?;
        tracing::debug!("Pushed notification to peer '{}'", peer_id);
        Ok(())
    }

    async fn close(&self, peer_id: &PeerId) -> bool {
        match self.channel_of(peer_id).await {
            Ok(channel) => {
                channel.close();
                true
            }
            Err(_) => false,
        }
    }

    async fn count_connected(&self) -> usize {
        self.clients.lock().await.len()
    }
}
