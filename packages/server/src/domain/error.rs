//! Domain error types.

use thiserror::Error;

/// Error kinds reported to clients on a rejected request.
///
/// All of them are recoverable at the connection boundary; only
/// `MessageTooLarge` and `PairingTimeout` close the offending connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Too many requests from this address")]
    RateLimited,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Room already has a receiver")]
    RoomNotJoinable,

    #[error("Room capacity of the relay exceeded")]
    CapacityExceeded,

    #[error("Message exceeds the maximum size")]
    MessageTooLarge,

    #[error("Invalid request")]
    InvalidRequest,

    #[error("Pairing timed out")]
    PairingTimeout,
}

impl RelayError {
    /// Whether the connection is closed after the error reply
    pub fn closes_connection(&self) -> bool {
        matches!(self, RelayError::MessageTooLarge | RelayError::PairingTimeout)
    }
}

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Invalid room id: '{0}'")]
    InvalidRoomId(String),

    #[error("Peer id must not be empty")]
    EmptyPeerId,
}

/// Room registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room registry is full")]
    CapacityExceeded,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is not joinable")]
    RoomNotJoinable,
}

impl From<RepositoryError> for RelayError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::CapacityExceeded => RelayError::CapacityExceeded,
            RepositoryError::RoomNotFound => RelayError::RoomNotFound,
            RepositoryError::RoomNotJoinable => RelayError::RoomNotJoinable,
        }
    }
}

/// Illegal session state transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session is already bound to a room")]
    AlreadyBound,

    #[error("Session is not awaiting a peer in room '{0}'")]
    NotAwaiting(String),

    #[error("Session is closed")]
    Closed,
}

/// Errors delivering to a peer's outbound channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Peer '{0}' not found")]
    PeerNotFound(String),

    #[error("Peer '{0}' connection is closed")]
    ChannelClosed(String),

    #[error("Peer '{0}' outbound buffer is full")]
    BufferFull(String),
}
