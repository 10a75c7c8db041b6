//! WebSocket control-plane message DTOs.
//!
//! Control messages are JSON objects discriminated by `type`. They are only
//! exchanged before pairing; afterwards frames carry no envelope.

use serde::{Deserialize, Serialize};

/// Messages a client sends before pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    CreateRoom,
    JoinRoom { room_id: String },
}

/// Messages the relay sends to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    RoomCreated { room_id: String },
    RoomJoined { room_id: String },
    PeerJoined { peer_id: String },
    PeerDisconnected,
    Error { reason: ErrorReason },
}

/// `reason` field of an error reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    RateLimited,
    RoomNotFound,
    RoomFull,
    CapacityExceeded,
    InvalidRequest,
    Timeout,
    MessageTooLarge,
}

impl ClientMessage {
    /// Parse a control message from a text or binary frame payload
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_room() {
        // テスト項目: CREATE_ROOM がパースされる
        // given (前提条件):
        let payload = br#"{"type":"CREATE_ROOM"}"#;

        // when (操作):
        let result = ClientMessage::parse(payload);

        // then (期待する結果):
        assert_eq!(result.unwrap(), ClientMessage::CreateRoom);
    }

    #[test]
    fn test_parse_join_room_with_extra_fields() {
        // テスト項目: 余分なフィールドを含む JOIN_ROOM もパースされる
        // given (前提条件):
        let payload = br#"{"type":"JOIN_ROOM","room_id":"abc123","client":"cli"}"#;

        // when (操作):
        let result = ClientMessage::parse(payload);

        // then (期待する結果):
        assert_eq!(
            result.unwrap(),
            ClientMessage::JoinRoom {
                room_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed_messages() {
        // テスト項目: 不正な制御メッセージはパースエラーになる
        // given (前提条件):
        let payloads: [&[u8]; 5] = [
            b"not json",
            br#"{"type":"JOIN_ROOM"}"#,
            br#"{"type":"DELETE_ROOM"}"#,
            br#"{"room_id":"abc123"}"#,
            br#"{"type":"create_room"}"#,
        ];

        for payload in payloads {
            // when (操作):
            let result = ClientMessage::parse(payload);

            // then (期待する結果):
            assert!(result.is_err(), "{:?} should be rejected", payload);
        }
    }

    #[test]
    fn test_server_messages_wire_format() {
        // テスト項目: サーバーメッセージが type 付きの JSON にシリアライズされる
        // given (前提条件):
        let messages = [
            (
                ServerMessage::RoomCreated {
                    room_id: "abc123".to_string(),
                },
                r#"{"type":"ROOM_CREATED","room_id":"abc123"}"#,
            ),
            (
                ServerMessage::PeerJoined {
                    peer_id: "conn_1".to_string(),
                },
                r#"{"type":"PEER_JOINED","peer_id":"conn_1"}"#,
            ),
            (
                ServerMessage::PeerDisconnected,
                r#"{"type":"PEER_DISCONNECTED"}"#,
            ),
            (
                ServerMessage::Error {
                    reason: ErrorReason::RoomFull,
                },
                r#"{"type":"ERROR","reason":"room_full"}"#,
            ),
        ];

        for (message, expected) in messages {
            // when (操作):
            let json = serde_json::to_string(&message).unwrap();

            // then (期待する結果):
            assert_eq!(json, expected);
        }
    }
}
