//! Room registry trait.
//!
//! The registry owns the mapping from room id to room state. Use cases depend
//! on this trait; the infrastructure layer provides the implementation.

use async_trait::async_trait;

use super::{ClosedRoom, PeerId, RepositoryError, Room, RoomId};

/// Room registry.
///
/// Every operation is linearizable with respect to the others: two concurrent
/// `join_room` calls on the same room yield exactly one success.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a new `AwaitingPeer` room with a fresh, unique id.
    ///
    /// Fails with `CapacityExceeded` without touching existing rooms when the
    /// registry is full.
    async fn create_room(&self, sender: PeerId) -> Result<Room, RepositoryError>;

    /// Bind `receiver` to the room, transitioning it to `Paired`.
    ///
    /// Absent, closed, or expired rooms are `RoomNotFound`; paired rooms are
    /// `RoomNotJoinable`. Nothing is mutated on failure.
    async fn join_room(&self, room_id: &RoomId, receiver: PeerId) -> Result<Room, RepositoryError>;

    /// Close and remove the room if `participant` belongs to it.
    ///
    /// Idempotent: returns the released participants only for the call that
    /// actually closed the room.
    async fn close_room(&self, room_id: &RoomId, participant: &PeerId) -> Option<ClosedRoom>;

    /// Look up a live room; expired rooms are not returned
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// Snapshot of every room currently in the registry, expired or not
    async fn list_rooms(&self) -> Vec<Room>;

    /// Number of rooms currently in the registry
    async fn count_rooms(&self) -> usize;
}
