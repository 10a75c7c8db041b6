//! Domain layer of the relay.
//!
//! Entities (`Room`, `Session`), value objects, and the traits the use cases
//! depend on. Concrete implementations live in the infrastructure layer.

pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod rate_limiter;
pub mod repository;
pub mod value_object;

pub use entity::{ClosedRoom, Role, Room, RoomState, Session, SessionState};
pub use error::{MessagePushError, RelayError, RepositoryError, SessionError, ValueObjectError};
pub use factory::{PeerIdFactory, RoomIdFactory};
pub use message_pusher::{MessagePusher, Notification, Outbound, PeerChannel, PeerOutbox};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use rate_limiter::RateLimiter;
pub use repository::RoomRepository;
pub use value_object::{ClientAddress, Frame, PeerId, RoomId};
