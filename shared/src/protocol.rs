//! Typed message envelope exchanged between client and server.
//!
//! Requests always receive exactly one response on the same connection.
//! Failure reasons travel as typed enums so clients never have to parse
//! error strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::framing::FrameError;

/// Registry-assigned room identifier, unique for the registry's lifetime.
pub type RoomId = String;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Message {
    LoginRequest {
        username: String,
        password: String,
    },
    LoginResponse {
        success: bool,
        error: Option<AuthError>,
    },
    RoomRequest {
        action: RoomAction,
        /// Required for [`RoomAction::JoinRoom`] and
        /// [`RoomAction::StartGame`], ignored for create.
        room_id: Option<RoomId>,
    },
    RoomResponse {
        success: bool,
        room_info: Option<RoomInfo>,
        error: Option<RoomError>,
    },
}

impl Message {
    pub fn login_ok() -> Self {
        Message::LoginResponse {
            success: true,
            error: None,
        }
    }

    pub fn login_err(error: AuthError) -> Self {
        Message::LoginResponse {
            success: false,
            error: Some(error),
        }
    }

    pub fn room_ok(room_info: RoomInfo) -> Self {
        Message::RoomResponse {
            success: true,
            room_info: Some(room_info),
            error: None,
        }
    }

    pub fn room_err(error: RoomError) -> Self {
        Message::RoomResponse {
            success: false,
            room_info: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    CreateRoom,
    JoinRoom,
    StartGame,
}

/// Room lifecycle. Transitions run one way: Waiting -> Playing -> Closed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Waiting,
    Playing,
    Closed,
}

/// Snapshot of a room as reported to clients. Members are listed in join
/// order; the first member is the owner while the room is waiting.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: RoomState,
    pub members: Vec<String>,
}

/// Login failures. Reported to the client; the connection stays open.
#[derive(Debug, Error, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session is already authenticated")]
    AlreadyAuthenticated,
}

/// Room operation failures. Reported to the client via `success: false`;
/// the connection stays open and no server-side state is mutated.
#[derive(Debug, Error, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    #[error("no room with that id")]
    NotFound,
    #[error("room is already at capacity")]
    Full,
    #[error("room is not accepting this operation in its current state")]
    InvalidState,
    #[error("session is already a member of this room")]
    AlreadyMember,
    #[error("only the room owner may start the game")]
    NotOwner,
    #[error("not enough players to start the game")]
    InsufficientPlayers,
    #[error("session is not authenticated")]
    Unauthenticated,
}

/// Errors that make the stream untrustworthy; the connection is closed.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("malformed message payload")]
    Malformed,
}

pub fn encode_message(message: &Message) -> Result<Vec<u8>, ProtocolError> {
    bincode::serialize(message).map_err(|_| ProtocolError::Malformed)
}

pub fn decode_message(bytes: &[u8]) -> Result<Message, ProtocolError> {
    bincode::deserialize(bytes).map_err(|_| ProtocolError::Malformed)
}
