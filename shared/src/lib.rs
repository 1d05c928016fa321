//! Wire protocol shared between the lobby server and its clients.
//!
//! Every message travels as a single frame: a 4-byte big-endian length
//! header followed by a bincode-encoded [`protocol::Message`] envelope.
//! The [`framing`] module owns the byte-level contract, [`protocol`] the
//! typed envelope and the failure reasons that are reported back to
//! clients.

pub mod framing;
pub mod protocol;

pub use framing::{read_frame, write_frame, FrameError, HEADER_LEN, MAX_FRAME_LEN};
pub use protocol::{
    decode_message, encode_message, AuthError, Message, ProtocolError, RoomAction, RoomError,
    RoomId, RoomInfo, RoomState,
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9527;
