//! Server state shared by every connection handler.

use std::sync::Arc;

use crate::{
    domain::MessagePusher,
    usecase::{
        ConnectPeerUseCase, CreateRoomUseCase, DisconnectPeerUseCase, ForwardFrameUseCase,
        GetRelayStatsUseCase, JoinRoomUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectPeerUseCase（ピア接続のユースケース）
    pub connect_peer_usecase: Arc<ConnectPeerUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// ForwardFrameUseCase（フレーム中継のユースケース）
    pub forward_frame_usecase: Arc<ForwardFrameUseCase>,
    /// DisconnectPeerUseCase（ピア切断のユースケース）
    pub disconnect_peer_usecase: Arc<DisconnectPeerUseCase>,
    /// GetRelayStatsUseCase（リレー状態取得のユースケース）
    pub get_relay_stats_usecase: Arc<GetRelayStatsUseCase>,
    /// MessagePusher（エラー応答の送信に使用）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Take the client address from `X-Forwarded-For`
    pub trust_forwarded_for: bool,
}
