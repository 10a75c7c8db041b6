//! Room entity: the rendezvous record pairing one sender and one receiver.

use std::{
    mem,
    time::{Duration, Instant},
};

use crate::domain::{PeerId, RepositoryError, RoomId};

/// Lifecycle state of a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomState {
    /// Created by a sender, waiting for a receiver to join
    AwaitingPeer { sender: PeerId },
    /// Both peers bound; frames are being forwarded
    Paired { sender: PeerId, receiver: PeerId },
    /// Terminal; participants are released
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Instant,
    state: RoomState,
}

/// Participants of a room at the moment it was closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRoom {
    pub id: RoomId,
    pub sender: PeerId,
    pub receiver: Option<PeerId>,
}

impl Room {
    /// Create a room awaiting a peer
    pub fn new(id: RoomId, sender: PeerId, created_at: Instant) -> Self {
        Self {
            id,
            created_at,
            state: RoomState::AwaitingPeer { sender },
        }
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    pub fn sender(&self) -> Option<&PeerId> {
        match &self.state {
            RoomState::AwaitingPeer { sender } | RoomState::Paired { sender, .. } => Some(sender),
            RoomState::Closed => None,
        }
    }

    pub fn receiver(&self) -> Option<&PeerId> {
        match &self.state {
            RoomState::Paired { receiver, .. } => Some(receiver),
            _ => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, RoomState::AwaitingPeer { .. })
    }

    pub fn is_paired(&self) -> bool {
        matches!(self.state, RoomState::Paired { .. })
    }

    pub fn has_participant(&self, peer: &PeerId) -> bool {
        self.sender() == Some(peer) || self.receiver() == Some(peer)
    }

    /// The other side of the room, if `peer` is a participant and it is paired
    pub fn counterpart_of(&self, peer: &PeerId) -> Option<&PeerId> {
        match &self.state {
            RoomState::Paired { sender, receiver } if sender == peer => Some(receiver),
            RoomState::Paired { sender, receiver } if receiver == peer => Some(sender),
            _ => None,
        }
    }

    /// Only rooms still awaiting a peer expire; paired rooms live until a disconnect.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.is_awaiting() && now.saturating_duration_since(self.created_at) > ttl
    }

    /// Bind the receiver: `AwaitingPeer → Paired`
    pub fn pair(&mut self, receiver: PeerId) -> Result<(), RepositoryError> {
        match &self.state {
            RoomState::AwaitingPeer { sender } => {
                self.state = RoomState::Paired {
                    sender: sender.clone(),
                    receiver,
                };
                Ok(())
            }
            RoomState::Paired { .. } => Err(RepositoryError::RoomNotJoinable),
            RoomState::Closed => Err(RepositoryError::RoomNotFound),
        }
    }

    /// Transition to `Closed`, releasing the participants.
    ///
    /// Returns `None` when the room was already closed.
    pub fn close(&mut self) -> Option<ClosedRoom> {
        match mem::replace(&mut self.state, RoomState::Closed) {
            RoomState::AwaitingPeer { sender } => Some(ClosedRoom {
                id: self.id.clone(),
                sender,
                receiver: None,
            }),
            RoomState::Paired { sender, receiver } => Some(ClosedRoom {
                id: self.id.clone(),
                sender,
                receiver: Some(receiver),
            }),
            RoomState::Closed => None,
        }
    }
}

impl ClosedRoom {
    pub fn counterpart_of(&self, peer: &PeerId) -> Option<&PeerId> {
        if &self.sender == peer {
            self.receiver.as_ref()
        } else if self.receiver.as_ref() == Some(peer) {
            Some(&self.sender)
        } else {
            None
        }
    }
}
