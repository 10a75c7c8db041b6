//! UseCase error types.

use thiserror::Error;

use crate::domain::{MessagePushError, RelayError};

/// Why a frame could not be relayed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("Frame of {0} bytes exceeds the maximum message size")]
    MessageTooLarge(usize),

    #[error("No peer has joined the room yet")]
    PeerNotReady,

    #[error("Room was closed before a peer joined")]
    RoomGone,

    #[error("Session is not bound to a room")]
    NotBound,

    #[error("Peer is unreachable: {0}")]
    PeerGone(#[from] MessagePushError),
}

impl ForwardError {
    /// Error reply owed to the client, if any.
    ///
    /// `PeerGone` has none: the connection goes straight to the disconnect path.
    pub fn reply(&self) -> Option<RelayError> {
        match self {
            ForwardError::MessageTooLarge(_) => Some(RelayError::MessageTooLarge),
            ForwardError::PeerNotReady | ForwardError::NotBound => Some(RelayError::InvalidRequest),
            ForwardError::RoomGone => Some(RelayError::PairingTimeout),
            ForwardError::PeerGone(_) => None,
        }
    }

    /// Whether the session must end after this error
    pub fn is_fatal(&self) -> bool {
        self.reply().is_none_or(|error| error.closes_connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_forward_errors() {
        // テスト項目: サイズ超過・ルーム消失・ピア消失のみが接続を終了させる
        // given (前提条件):
        let gone = ForwardError::PeerGone(MessagePushError::PeerNotFound("x".to_string()));

        // when (操作):

        // then (期待する結果):
        assert!(ForwardError::MessageTooLarge(11).is_fatal());
        assert!(ForwardError::RoomGone.is_fatal());
        assert!(gone.is_fatal());
        assert!(!ForwardError::PeerNotReady.is_fatal());
        assert!(!ForwardError::NotBound.is_fatal());
    }
}
