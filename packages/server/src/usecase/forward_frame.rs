//! UseCase: フレーム中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ForwardFrameUseCase::execute() メソッド
//! - フレームがバイト単位で改変されずに相手へ届くこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：ペア済みの受信者から送信者へ、送信者から受信者へ
//! - 異常系：最大サイズ超過、相手未参加、ルーム消失
//! - エッジケース：PEER_JOINED 後の最初のフレームで送信者側のペアを確定

use std::sync::Arc;

use crate::{
    domain::{Frame, MessagePusher, PeerId, RoomRepository, Session, SessionState},
    usecase::error::ForwardError,
};

/// フレーム中継のユースケース
pub struct ForwardFrameUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 1 フレームの最大バイト数
    max_message_size: usize,
}

impl ForwardFrameUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        max_message_size: usize,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            max_message_size,
        }
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// 最大サイズを超えるフレームを拒否する（制御メッセージも対象）
    pub fn admit(&self, frame: &Frame) -> Result<(), ForwardError> {
        if frame.len() > self.max_message_size {
            return Err(ForwardError::MessageTooLarge(frame.len()));
        }
        Ok(())
    }

    /// 相手のピアへフレームをそのまま中継
    pub async fn execute(&self, session: &mut Session, frame: Frame) -> Result<(), ForwardError> {
        self.admit(&frame)?;
        let peer = self.resolve_peer(session).await?;
        self.message_pusher.push_frame(&peer, frame).await?;
        Ok(())
    }

    /// このセッションの相手のピアを解決する
    ///
    /// 送信者はペア成立後に最初のフレームを送る時点で、Registry から受信者を知る。
    async fn resolve_peer(&self, session: &mut Session) -> Result<PeerId, ForwardError> {
        let room_id = match session.state() {
            SessionState::Paired { peer, .. } => return Ok(peer.clone()),
            SessionState::AwaitingPeer { room_id } => room_id.clone(),
            SessionState::Connected | SessionState::Closed => return Err(ForwardError::NotBound),
        };

        let room = self
            .repository
            .get_room(&room_id)
            .await
            .filter(|room| room.sender() == Some(session.peer_id()))
            .ok_or(ForwardError::RoomGone)?;

        let receiver = room.receiver().cloned().ok_or(ForwardError::PeerNotReady)?;
        session
            .pair_as_sender(receiver.clone())
            .map_err(|_| ForwardError::NotBound)?;
        tracing::debug!("Sender '{}' bound to receiver '{}'", session.peer_id(), receiver);
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Outbound, Role, RoomId},
        usecase::{
            CreateRoomUseCase, JoinRoomUseCase,
            testing::{
                TEST_TTL, connect, create_test_message_pusher, create_test_rate_limiter,
                create_test_repository, peer, policy,
            },
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use kakehashi_shared::time::ManualClock;
    use std::time::Duration;

    struct Fixture {
        clock: Arc<ManualClock>,
        repository: Arc<InMemoryRoomRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        create: CreateRoomUseCase,
        join: JoinRoomUseCase,
        forward: ForwardFrameUseCase,
    }

    fn fixture(max_message_size: usize) -> Fixture {
        let clock = Arc::new(ManualClock::new());
        let repository = create_test_repository(10, clock.clone());
        let rate_limiter = create_test_rate_limiter(clock.clone());
        let pusher = create_test_message_pusher();
        Fixture {
            create: CreateRoomUseCase::new(
                repository.clone(),
                rate_limiter.clone(),
                pusher.clone(),
                policy(20),
            ),
            join: JoinRoomUseCase::new(
                repository.clone(),
                rate_limiter,
                pusher.clone(),
                policy(20),
            ),
            forward: ForwardFrameUseCase::new(repository.clone(), pusher.clone(), max_message_size),
            clock,
            repository,
            pusher,
        }
    }

    #[tokio::test]
    async fn test_frames_are_relayed_verbatim_both_ways() {
        // テスト項目: テキスト・バイナリのフレームが改変されずに双方向へ中継される
        // given (前提条件):
        let f = fixture(1024);
        let (mut sender, mut sender_outbox) = connect(&f.pusher, "alice", 1).await;
        let (mut receiver, mut receiver_outbox) = connect(&f.pusher, "bob", 2).await;
        let room_id = f.create.execute(&mut sender).await.unwrap();
        f.join.execute(&mut receiver, room_id.as_str()).await.unwrap();
        sender_outbox.receiver.recv().await; // ROOM_CREATED
        sender_outbox.receiver.recv().await; // PEER_JOINED
        receiver_outbox.receiver.recv().await; // ROOM_JOINED

        // when (操作):
        let binary = Frame::Binary(vec![0, 159, 146, 150, 255]);
        let text = Frame::Text("{\"type\":\"CREATE_ROOM\"}".to_string());
        f.forward.execute(&mut sender, binary.clone()).await.unwrap();
        f.forward.execute(&mut receiver, text.clone()).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            receiver_outbox.receiver.recv().await,
            Some(Outbound::Frame(binary))
        );
        assert_eq!(sender_outbox.receiver.recv().await, Some(Outbound::Frame(text)));
        assert_eq!(
            sender.state(),
            &SessionState::Paired {
                room_id,
                role: Role::Sender,
                peer: peer("bob"),
            }
        );
    }

    #[tokio::test]
    async fn test_frame_at_limit_passes_and_over_limit_is_rejected() {
        // テスト項目: 最大サイズちょうどのフレームは中継され、1 バイト超過は MessageTooLarge
        // given (前提条件):
        let f = fixture(8);
        let (mut sender, _sender_outbox) = connect(&f.pusher, "alice", 1).await;
        let (mut receiver, mut receiver_outbox) = connect(&f.pusher, "bob", 2).await;
        let room_id = f.create.execute(&mut sender).await.unwrap();
        f.join.execute(&mut receiver, room_id.as_str()).await.unwrap();
        receiver_outbox.receiver.recv().await;

        // when (操作):
        let at_limit = f.forward.execute(&mut sender, Frame::Binary(vec![1; 8])).await;
        let over_limit = f.forward.execute(&mut sender, Frame::Binary(vec![1; 9])).await;

        // then (期待する結果):
        assert!(at_limit.is_ok());
        assert_eq!(over_limit, Err(ForwardError::MessageTooLarge(9)));
        assert_eq!(
            receiver_outbox.receiver.recv().await,
            Some(Outbound::Frame(Frame::Binary(vec![1; 8])))
        );
        assert!(receiver_outbox.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sender_without_peer_is_not_ready() {
        // テスト項目: 相手未参加の送信者からのフレームは PeerNotReady となり状態は維持される
        // given (前提条件):
        let f = fixture(1024);
        let (mut sender, _outbox) = connect(&f.pusher, "alice", 1).await;
        let room_id = f.create.execute(&mut sender).await.unwrap();

        // when (操作):
        let result = f
            .forward
            .execute(&mut sender, Frame::Text("early".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ForwardError::PeerNotReady));
        assert_eq!(sender.state(), &SessionState::AwaitingPeer { room_id });
    }

    #[tokio::test]
    async fn test_sender_of_expired_room_sees_room_gone() {
        // テスト項目: TTL を過ぎたルームの送信者からのフレームは RoomGone
        // given (前提条件):
        let f = fixture(1024);
        let (mut sender, _outbox) = connect(&f.pusher, "alice", 1).await;
        f.create.execute(&mut sender).await.unwrap();
        f.clock.advance(TEST_TTL + Duration::from_secs(1));

        // when (操作):
        let result = f
            .forward
            .execute(&mut sender, Frame::Text("late".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ForwardError::RoomGone));
        assert_eq!(f.repository.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_unbound_session_cannot_forward() {
        // テスト項目: ルームに属さないセッションからのフレームは NotBound
        // given (前提条件):
        let f = fixture(1024);
        let (mut session, _outbox) = connect(&f.pusher, "alice", 1).await;

        // when (操作):
        let result = f
            .forward
            .execute(&mut session, Frame::Text("hello".to_string()))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(ForwardError::NotBound));
    }

    #[tokio::test]
    async fn test_forward_to_departed_peer_fails() {
        // テスト項目: 相手が登録解除済みの場合は PeerGone となる
        // given (前提条件):
        let f = fixture(1024);
        let (mut sender, _sender_outbox) = connect(&f.pusher, "alice", 1).await;
        let (mut receiver, _receiver_outbox) = connect(&f.pusher, "bob", 2).await;
        let room_id: RoomId = f.create.execute(&mut sender).await.unwrap();
        f.join.execute(&mut receiver, room_id.as_str()).await.unwrap();
        f.pusher.unregister_client(&peer("bob")).await;

        // when (操作):
        let result = f
            .forward
            .execute(&mut sender, Frame::Text("hello".to_string()))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(ForwardError::PeerGone(_))));
        assert!(result.is_err_and(|e| e.is_fatal()));
    }
}
