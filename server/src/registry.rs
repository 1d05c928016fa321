//! Process-wide table of active rooms and their lifecycle state machine.
//!
//! The registry is the only component allowed to mutate a room. All
//! operations take the registry lock, evaluate their preconditions at the
//! instant of mutation and either apply fully or leave the table
//! untouched. The game handoff on a successful start happens after the
//! lock is released.

use log::{debug, info};
use shared::protocol::{RoomError, RoomInfo, RoomState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::game::{GameLauncher, LogLauncher};

/// Server-side identity of one live connection.
pub type SessionId = u64;

/// Room parameters external to the core state machine.
#[derive(Debug, Clone, Copy)]
pub struct RoomConfig {
    /// Maximum members per room.
    pub capacity: usize,
    /// Member count required before the owner may start the game.
    pub min_players: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capacity: 8,
            min_players: 2,
        }
    }
}

#[derive(Debug)]
struct Member {
    session: SessionId,
    username: String,
}

#[derive(Debug)]
struct Room {
    id: String,
    owner: SessionId,
    members: Vec<Member>,
    state: RoomState,
}

impl Room {
    fn contains(&self, session: SessionId) -> bool {
        self.members.iter().any(|m| m.session == session)
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.id.clone(),
            state: self.state,
            members: self.members.iter().map(|m| m.username.clone()).collect(),
        }
    }
}

#[derive(Default)]
struct Table {
    rooms: HashMap<String, Room>,
    next_room_id: u32,
}

/// Shared room registry. Constructed once at server startup and handed to
/// every connection handler as an `Arc`; tests build one per case.
pub struct RoomRegistry {
    table: Mutex<Table>,
    config: RoomConfig,
    launcher: Arc<dyn GameLauncher>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self::with_launcher(config, Arc::new(LogLauncher))
    }

    pub fn with_launcher(config: RoomConfig, launcher: Arc<dyn GameLauncher>) -> Self {
        Self {
            table: Mutex::new(Table {
                rooms: HashMap::new(),
                next_room_id: 1000,
            }),
            config,
            launcher,
        }
    }

    pub fn config(&self) -> RoomConfig {
        self.config
    }

    /// Creates a new waiting room owned by `session` and returns its info.
    pub async fn create_room(&self, session: SessionId, username: &str) -> RoomInfo {
        let mut table = self.table.lock().await;
        let id = table.next_room_id.to_string();
        table.next_room_id += 1;

        let room = Room {
            id: id.clone(),
            owner: session,
            members: vec![Member {
                session,
                username: username.to_string(),
            }],
            state: RoomState::Waiting,
        };
        let created = room.info();
        table.rooms.insert(id, room);

        info!("session {} created room {}", session, created.room_id);
        created
    }

    /// Appends `session` to the room's member list, preserving join order.
    ///
    /// The capacity check and the append happen under the same lock, so
    /// concurrent joins racing for the last open slot resolve to exactly
    /// one success.
    pub async fn join_room(
        &self,
        session: SessionId,
        username: &str,
        room_id: &str,
    ) -> Result<RoomInfo, RoomError> {
        let mut table = self.table.lock().await;
        let room = table.rooms.get_mut(room_id).ok_or(RoomError::NotFound)?;

        if room.state != RoomState::Waiting {
            return Err(RoomError::InvalidState);
        }
        if room.contains(session) {
            return Err(RoomError::AlreadyMember);
        }
        if room.members.len() >= self.config.capacity {
            return Err(RoomError::Full);
        }

        room.members.push(Member {
            session,
            username: username.to_string(),
        });
        info!("session {} joined room {}", session, room_id);
        Ok(room.info())
    }

    /// Transitions a waiting room to playing and hands it off to the game
    /// engine. Only the owner may start, and only once the member count
    /// meets the configured minimum.
    pub async fn start_game(
        &self,
        session: SessionId,
        room_id: &str,
    ) -> Result<RoomInfo, RoomError> {
        let started = {
            let mut table = self.table.lock().await;
            let room = table.rooms.get_mut(room_id).ok_or(RoomError::NotFound)?;

            if room.owner != session {
                return Err(RoomError::NotOwner);
            }
            if room.state != RoomState::Waiting {
                return Err(RoomError::InvalidState);
            }
            if room.members.len() < self.config.min_players {
                return Err(RoomError::InsufficientPlayers);
            }

            room.state = RoomState::Playing;
            room.info()
        };

        // Handoff happens outside the lock; engine startup must not stall
        // other rooms.
        info!(
            "room {} started with {} players",
            started.room_id,
            started.members.len()
        );
        self.launcher.launch(started.clone());
        Ok(started)
    }

    /// Removes `session` from the room. An emptied room is closed and
    /// evicted; if the owner leaves while the room is waiting, ownership
    /// passes to the next member in join order.
    pub async fn leave_room(&self, session: SessionId, room_id: &str) {
        let mut table = self.table.lock().await;
        let Some(room) = table.rooms.get_mut(room_id) else {
            return;
        };

        let before = room.members.len();
        room.members.retain(|m| m.session != session);
        if room.members.len() == before {
            return;
        }
        debug!("session {} left room {}", session, room_id);

        if room.members.is_empty() {
            room.state = RoomState::Closed;
        } else if room.owner == session && room.state == RoomState::Waiting {
            room.owner = room.members[0].session;
            debug!(
                "room {} ownership transferred to session {}",
                room_id, room.owner
            );
        }

        if room.state == RoomState::Closed {
            table.rooms.remove(room_id);
            info!("room {} closed", room_id);
        }
    }

    /// Current snapshot of a room, if it is still registered.
    pub async fn room(&self, room_id: &str) -> Option<RoomInfo> {
        let table = self.table.lock().await;
        table.rooms.get(room_id).map(Room::info)
    }

    pub async fn room_count(&self) -> usize {
        self.table.lock().await.rooms.len()
    }
}
