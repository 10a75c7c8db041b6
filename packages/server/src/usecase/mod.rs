//! UseCase layer: one struct per relay operation.

mod connect_peer;
mod create_room;
mod disconnect_peer;
mod error;
mod forward_frame;
mod get_relay_stats;
mod join_room;
mod reap_rooms;

pub use connect_peer::ConnectPeerUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_peer::DisconnectPeerUseCase;
pub use error::ForwardError;
pub use forward_frame::ForwardFrameUseCase;
pub use get_relay_stats::{GetRelayStatsUseCase, RelayStats};
pub use join_room::JoinRoomUseCase;
pub use reap_rooms::{ReapRoomsUseCase, ReapSummary};

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the use case tests.

    use std::{
        collections::HashMap,
        net::{IpAddr, Ipv4Addr},
        sync::Arc,
        time::Duration,
    };

    use kakehashi_shared::time::ManualClock;
    use tokio::sync::Mutex;

    use crate::{
        config::RateLimitPolicy,
        domain::{ClientAddress, MessagePusher, PeerChannel, PeerId, PeerOutbox, Session},
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            rate_limiter::SlidingWindowRateLimiter,
            repository::{InMemoryRoomRepository, RegistrySettings},
        },
    };

    pub const TEST_TTL: Duration = Duration::from_secs(60);

    pub fn policy(max_events: usize) -> RateLimitPolicy {
        RateLimitPolicy {
            max_events,
            window: Duration::from_secs(60),
        }
    }

    pub fn create_test_repository(
        max_rooms: usize,
        clock: Arc<ManualClock>,
    ) -> Arc<InMemoryRoomRepository> {
        Arc::new(InMemoryRoomRepository::new(
            RegistrySettings {
                max_rooms,
                room_ttl: TEST_TTL,
            },
            clock,
        ))
    }

    pub fn create_test_rate_limiter(clock: Arc<ManualClock>) -> Arc<SlidingWindowRateLimiter> {
        Arc::new(SlidingWindowRateLimiter::new(clock))
    }

    pub fn create_test_message_pusher() -> Arc<WebSocketMessagePusher> {
        Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))))
    }

    pub fn address(last: u8) -> ClientAddress {
        ClientAddress::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, last)))
    }

    pub fn peer(name: &str) -> PeerId {
        PeerId::new(name.to_string()).unwrap()
    }

    /// Register a connected peer and return its session and outbox
    pub async fn connect(
        pusher: &Arc<WebSocketMessagePusher>,
        name: &str,
        address_last: u8,
    ) -> (Session, PeerOutbox) {
        let (channel, outbox) = PeerChannel::new(peer(name), 16);
        pusher.register_client(peer(name), channel).await;
        (Session::new(peer(name), address(address_last)), outbox)
    }
}
