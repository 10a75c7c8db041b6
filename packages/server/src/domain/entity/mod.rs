//! Domain entities.

mod room;
mod session;

pub use room::{ClosedRoom, Room, RoomState};
pub use session::{Role, Session, SessionState};
