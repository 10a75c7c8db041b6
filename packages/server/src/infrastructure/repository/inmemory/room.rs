//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `HashMap<RoomId, Room>` を単一の Mutex で保護し、create / join / close を
//! 互いに直列化します。

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use kakehashi_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ClosedRoom, PeerId, RepositoryError, Room, RoomId, RoomIdFactory, RoomRepository,
};

/// Room id regeneration attempts before a create is reported as over capacity
const MAX_ID_ATTEMPTS: usize = 100;

/// Registry limits
#[derive(Debug, Clone, Copy)]
pub struct RegistrySettings {
    /// Maximum number of rooms held at once
    pub max_rooms: usize,
    /// How long a room may stay unpaired
    pub room_ttl: Duration,
}

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, Room>>,
    settings: RegistrySettings,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(settings: RegistrySettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            settings,
            clock,
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, sender: PeerId) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.len() >= self.settings.max_rooms {
            return Err(RepositoryError::CapacityExceeded);
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let room_id = RoomIdFactory::generate();
            if rooms.contains_key(&room_id) {
                tracing::debug!("Room id '{}' collided, regenerating", room_id);
                continue;
            }
            let room = Room::new(room_id.clone(), sender, self.clock.now());
            rooms.insert(room_id, room.clone());
            return Ok(room);
        }

        tracing::warn!("Could not find a free room id after {} attempts", MAX_ID_ATTEMPTS);
        Err(RepositoryError::CapacityExceeded)
    }

    async fn join_room(&self, room_id: &RoomId, receiver: PeerId) -> Result<Room, RepositoryError> {
        let now = self.clock.now();
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id).ok_or(RepositoryError::RoomNotFound)?;
        if room.is_expired(now, self.settings.room_ttl) {
            return Err(RepositoryError::RoomNotFound);
        }
        room.pair(receiver)?;
        Ok(room.clone())
    }

    async fn close_room(&self, room_id: &RoomId, participant: &PeerId) -> Option<ClosedRoom> {
        let mut rooms = self.rooms.lock().await;
        if !rooms.get(room_id)?.has_participant(participant) {
            return None;
        }
        let mut room = rooms.remove(room_id)?;
        room.close()
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let now = self.clock.now();
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .filter(|room| !room.is_expired(now, self.settings.room_ttl))
            .cloned()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }

    async fn count_rooms(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PeerIdFactory, RoomState};
    use kakehashi_shared::time::ManualClock;
    use std::collections::HashSet;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository の create / join / close / get
    // - 容量制限、TTL による期限切れ、close の冪等性
    // - 同一 Room への同時 join が一つだけ成功すること
    //
    // 【なぜこのテストが必要か】
    // - Registry は全接続と Reaper から同時に操作される唯一の共有状態
    // - 失敗時に状態を変更しないことを保証する必要がある
    // ========================================

    fn create_test_repository(max_rooms: usize) -> (Arc<InMemoryRoomRepository>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let settings = RegistrySettings {
            max_rooms,
            room_ttl: Duration::from_secs(60),
        };
        let repo = Arc::new(InMemoryRoomRepository::new(settings, clock.clone()));
        (repo, clock)
    }

    fn peer(name: &str) -> PeerId {
        PeerId::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_generates_unique_ids() {
        // テスト項目: 作成された Room の id は形式を満たし、生存中の Room 間で一意
        // given (前提条件):
        let (repo, _clock) = create_test_repository(1000);

        // when (操作):
        let mut ids = HashSet::new();
        for _ in 0..500 {
            let room = repo.create_room(PeerIdFactory::generate()).await.unwrap();
            ids.insert(room.id.into_string());
        }

        // then (期待する結果):
        assert_eq!(ids.len(), 500);
        assert_eq!(repo.count_rooms().await, 500);
    }

    #[tokio::test]
    async fn test_create_room_at_capacity_keeps_existing_rooms() {
        // テスト項目: 容量上限では CapacityExceeded となり既存の Room は削除されない
        // given (前提条件):
        let (repo, _clock) = create_test_repository(1000);
        let mut created = Vec::new();
        for _ in 0..1000 {
            created.push(repo.create_room(PeerIdFactory::generate()).await.unwrap());
        }

        // when (操作):
        let result = repo.create_room(peer("late")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::CapacityExceeded));
        assert_eq!(repo.count_rooms().await, 1000);
        for room in &created {
            assert!(repo.get_room(&room.id).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_join_room_pairs_receiver() {
        // テスト項目: join すると Room が PAIRED になり受信者が設定される
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();

        // when (操作):
        let joined = repo.join_room(&room.id, peer("bob")).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            joined.state(),
            &RoomState::Paired {
                sender: peer("alice"),
                receiver: peer("bob"),
            }
        );
        assert!(repo.get_room(&room.id).await.unwrap().is_paired());
    }

    #[tokio::test]
    async fn test_join_room_failures_do_not_mutate() {
        // テスト項目: 存在しない Room は RoomNotFound、PAIRED の Room は RoomNotJoinable で状態は変わらない
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();
        repo.join_room(&room.id, peer("bob")).await.unwrap();
        let unknown = RoomId::new("zzzzzz".to_string()).unwrap();

        // when (操作):
        let not_found = repo.join_room(&unknown, peer("carol")).await;
        let not_joinable = repo.join_room(&room.id, peer("carol")).await;

        // then (期待する結果):
        assert_eq!(not_found, Err(RepositoryError::RoomNotFound));
        assert_eq!(not_joinable, Err(RepositoryError::RoomNotJoinable));
        let current = repo.get_room(&room.id).await.unwrap();
        assert_eq!(current.receiver(), Some(&peer("bob")));
        assert_eq!(repo.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_joins_yield_exactly_one_success() {
        // テスト項目: 同一 Room への N 個の同時 join のうち成功は一つだけ
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();

        // when (操作):
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repo = repo.clone();
                let room_id = room.id.clone();
                tokio::spawn(async move { repo.join_room(&room_id, peer(&format!("r{}", i))).await })
            })
            .collect();
        let mut successes = 0;
        let mut not_joinable = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(RepositoryError::RoomNotJoinable) => not_joinable += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        // then (期待する結果):
        assert_eq!(successes, 1);
        assert_eq!(not_joinable, 31);
        let current = repo.get_room(&room.id).await.unwrap();
        assert!(current.is_paired());
    }

    #[tokio::test]
    async fn test_close_room_is_idempotent() {
        // テスト項目: close は一度目だけ参加者を返し、Room は Registry から削除される
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();
        repo.join_room(&room.id, peer("bob")).await.unwrap();

        // when (操作):
        let first = repo.close_room(&room.id, &peer("bob")).await;
        let second = repo.close_room(&room.id, &peer("alice")).await;

        // then (期待する結果):
        let closed = first.expect("first close releases participants");
        assert_eq!(closed.counterpart_of(&peer("bob")), Some(&peer("alice")));
        assert_eq!(second, None);
        assert!(repo.get_room(&room.id).await.is_none());
        assert_eq!(repo.count_rooms().await, 0);
    }

    #[tokio::test]
    async fn test_close_room_ignores_non_participants() {
        // テスト項目: 参加者でないピアからの close では Room は閉じられない
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();

        // when (操作):
        let result = repo.close_room(&room.id, &peer("mallory")).await;

        // then (期待する結果):
        assert_eq!(result, None);
        assert!(repo.get_room(&room.id).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_room_is_hidden_and_not_joinable() {
        // テスト項目: TTL を超えた未ペアの Room は検索されず join も RoomNotFound になる
        // given (前提条件):
        let (repo, clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();

        // when (操作):
        clock.advance(Duration::from_secs(61));
        let lookup = repo.get_room(&room.id).await;
        let join = repo.join_room(&room.id, peer("bob")).await;

        // then (期待する結果):
        assert!(lookup.is_none());
        assert_eq!(join, Err(RepositoryError::RoomNotFound));
        // The reaper is responsible for removing it
        assert_eq!(repo.list_rooms().await.len(), 1);
    }

    #[tokio::test]
    async fn test_paired_room_does_not_expire() {
        // テスト項目: PAIRED の Room は TTL を超えても検索できる
        // given (前提条件):
        let (repo, clock) = create_test_repository(10);
        let room = repo.create_room(peer("alice")).await.unwrap();
        repo.join_room(&room.id, peer("bob")).await.unwrap();

        // when (操作):
        clock.advance(Duration::from_secs(3600));

        // then (期待する結果):
        assert!(repo.get_room(&room.id).await.is_some());
    }
}
