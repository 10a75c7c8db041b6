//! Outbound delivery to peer connections.
//!
//! Every accepted connection registers a `PeerChannel`; other execution
//! contexts (the counterpart's loop, the reaper) reach it only through the
//! `MessagePusher` by peer id, looked up at the moment of delivery.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use super::{Frame, MessagePushError, PeerId, RelayError, RoomId};

/// Control-plane messages the relay sends to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    RoomCreated(RoomId),
    RoomJoined(RoomId),
    PeerJoined(PeerId),
    PeerDisconnected,
    Rejected(RelayError),
}

/// One event queued for a connection's writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Frame(Frame),
    Notification(Notification),
}

/// Sending half of a connection's outbound queue plus its shutdown signal
#[derive(Debug, Clone)]
pub struct PeerChannel {
    peer_id: PeerId,
    outbound: mpsc::Sender<Outbound>,
    shutdown: Arc<Notify>,
}

/// Receiving half, owned by the connection's writer task
#[derive(Debug)]
pub struct PeerOutbox {
    pub receiver: mpsc::Receiver<Outbound>,
    pub shutdown: Arc<Notify>,
}

impl PeerChannel {
    /// Create a bounded outbound queue holding at most `capacity` events
    pub fn new(peer_id: PeerId, capacity: usize) -> (PeerChannel, PeerOutbox) {
        let (outbound, receiver) = mpsc::channel(capacity);
        let shutdown = Arc::new(Notify::new());
        let channel = PeerChannel {
            peer_id,
            outbound,
            shutdown: shutdown.clone(),
        };
        (channel, PeerOutbox { receiver, shutdown })
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Queue a relayed frame, waiting for buffer space
    pub async fn deliver(&self, frame: Frame) -> Result<(), MessagePushError> {
        self.outbound
            .send(Outbound::Frame(frame))
            .await
            .map_err(|_| MessagePushError::ChannelClosed(self.peer_id.to_string()))
    }

    /// Queue a control notification without waiting
    pub fn notify(&self, notification: Notification) -> Result<(), MessagePushError> {
        self.outbound
            .try_send(Outbound::Notification(notification))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    MessagePushError::BufferFull(self.peer_id.to_string())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    MessagePushError::ChannelClosed(self.peer_id.to_string())
                }
            })
    }

    /// Ask the writer to flush what is queued and close the connection
    pub fn close(&self) {
        self.shutdown.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// Outbound delivery interface used by the use cases
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a connection's channel under its peer id
    async fn register_client(&self, peer_id: PeerId, channel: PeerChannel);

    /// Remove a connection's channel; later deliveries fail with `PeerNotFound`
    async fn unregister_client(&self, peer_id: &PeerId);

    /// Whether a live channel is registered for the peer
    async fn is_connected(&self, peer_id: &PeerId) -> bool;

    /// Relay a frame verbatim to the peer
    async fn push_frame(&self, peer_id: &PeerId, frame: Frame) -> Result<(), MessagePushError>;

    /// Send a control notification to the peer
    async fn push_notification(
        &self,
        peer_id: &PeerId,
        notification: Notification,
    ) -> Result<(), MessagePushError>;

    /// Close the peer's connection after flushing queued events.
    ///
    /// Returns `false` when the peer is not registered.
    async fn close(&self, peer_id: &PeerId) -> bool;

    /// Number of registered connections
    async fn count_connected(&self) -> usize;
}
