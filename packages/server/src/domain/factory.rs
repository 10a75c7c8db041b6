//! Identifier factories.

use rand::Rng;
use uuid::Uuid;

use super::value_object::{PeerId, ROOM_ID_ALPHABET, ROOM_ID_LENGTH, RoomId};

/// Random room identifier generator
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a random 6-character `[a-z0-9]` room id.
    ///
    /// Uniqueness among live rooms is the registry's job.
    pub fn generate() -> RoomId {
        let mut rng = rand::thread_rng();
        let value: String = (0..ROOM_ID_LENGTH)
            .map(|_| ROOM_ID_ALPHABET[rng.gen_range(0..ROOM_ID_ALPHABET.len())] as char)
            .collect();
        RoomId::from_generated(value)
    }
}

/// Connection identifier generator
pub struct PeerIdFactory;

impl PeerIdFactory {
    /// Generate a `conn_<32 hex>` peer id
    pub fn generate() -> PeerId {
        PeerId::from_generated(format!("conn_{}", Uuid::new_v4().simple()))
    }
}
