//! Connection session: one accepted connection and its role/room binding.

use std::mem;

use crate::domain::{ClientAddress, PeerId, RoomId, SessionError};

/// Side of the room a session plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

/// Session lifecycle.
///
/// Senders go `Connected → AwaitingPeer → Paired → Closed`; receivers skip
/// `AwaitingPeer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    AwaitingPeer {
        room_id: RoomId,
    },
    Paired {
        room_id: RoomId,
        role: Role,
        peer: PeerId,
    },
    Closed,
}

#[derive(Debug, Clone)]
pub struct Session {
    peer_id: PeerId,
    address: ClientAddress,
    state: SessionState,
}

impl Session {
    pub fn new(peer_id: PeerId, address: ClientAddress) -> Self {
        Self {
            peer_id,
            address,
            state: SessionState::Connected,
        }
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn address(&self) -> &ClientAddress {
        &self.address
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.state {
            SessionState::AwaitingPeer { room_id } | SessionState::Paired { room_id, .. } => {
                Some(room_id)
            }
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match &self.state {
            SessionState::AwaitingPeer { .. } => Some(Role::Sender),
            SessionState::Paired { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// `Connected → AwaitingPeer` after a successful `CREATE_ROOM`
    pub fn await_peer(&mut self, room_id: RoomId) -> Result<(), SessionError> {
        match self.state {
            SessionState::Connected => {
                self.state = SessionState::AwaitingPeer { room_id };
                Ok(())
            }
            SessionState::Closed => Err(SessionError::Closed),
            _ => Err(SessionError::AlreadyBound),
        }
    }

    /// `AwaitingPeer → Paired` once the sender learns who joined
    pub fn pair_as_sender(&mut self, receiver: PeerId) -> Result<(), SessionError> {
        match &self.state {
            SessionState::AwaitingPeer { room_id } => {
                self.state = SessionState::Paired {
                    room_id: room_id.clone(),
                    role: Role::Sender,
                    peer: receiver,
                };
                Ok(())
            }
            SessionState::Closed => Err(SessionError::Closed),
            SessionState::Connected => Err(SessionError::NotAwaiting(String::new())),
            SessionState::Paired { room_id, .. } => {
                Err(SessionError::NotAwaiting(room_id.as_str().to_string()))
            }
        }
    }

    /// `Connected → Paired` after a successful `JOIN_ROOM`
    pub fn pair_as_receiver(&mut self, room_id: RoomId, sender: PeerId) -> Result<(), SessionError> {
        match self.state {
            SessionState::Connected => {
                self.state = SessionState::Paired {
                    room_id,
                    role: Role::Receiver,
                    peer: sender,
                };
                Ok(())
            }
            SessionState::Closed => Err(SessionError::Closed),
            _ => Err(SessionError::AlreadyBound),
        }
    }

    /// Move to `Closed`, returning the state the session was in
    pub fn close(&mut self) -> SessionState {
        mem::replace(&mut self.state, SessionState::Closed)
    }
}
