//! Conversion logic between DTOs and domain types.

use crate::domain::{Notification, RelayError};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain → DTO
// ========================================

impl From<RelayError> for dto::ErrorReason {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::RateLimited => dto::ErrorReason::RateLimited,
            RelayError::RoomNotFound => dto::ErrorReason::RoomNotFound,
            RelayError::RoomNotJoinable => dto::ErrorReason::RoomFull,
            RelayError::CapacityExceeded => dto::ErrorReason::CapacityExceeded,
            RelayError::MessageTooLarge => dto::ErrorReason::MessageTooLarge,
            RelayError::InvalidRequest => dto::ErrorReason::InvalidRequest,
            RelayError::PairingTimeout => dto::ErrorReason::Timeout,
        }
    }
}

impl From<Notification> for dto::ServerMessage {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::RoomCreated(room_id) => dto::ServerMessage::RoomCreated {
                room_id: room_id.into_string(),
            },
            Notification::RoomJoined(room_id) => dto::ServerMessage::RoomJoined {
                room_id: room_id.into_string(),
            },
            Notification::PeerJoined(peer_id) => dto::ServerMessage::PeerJoined {
                peer_id: peer_id.into_string(),
            },
            Notification::PeerDisconnected => dto::ServerMessage::PeerDisconnected,
            Notification::Rejected(error) => dto::ServerMessage::Error {
                reason: error.into(),
            },
        }
    }
}
