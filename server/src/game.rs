//! Boundary to the card-game rules engine.
//!
//! The registry hands a room over once it transitions to playing; what
//! happens inside the game is the engine's concern. The handoff is
//! fire-and-forget and must never block a registry operation.

use log::info;
use shared::protocol::RoomInfo;

pub trait GameLauncher: Send + Sync {
    fn launch(&self, room: RoomInfo);
}

/// Placeholder launcher used until a real engine is wired in. Logs the
/// handoff and nothing else.
pub struct LogLauncher;

impl GameLauncher for LogLauncher {
    fn launch(&self, room: RoomInfo) {
        info!(
            "handing room {} off to the game engine ({} players)",
            room.room_id,
            room.members.len()
        );
    }
}
