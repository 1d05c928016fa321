//! Request/response connection to the lobby server.

use log::debug;
use shared::framing::{read_frame, write_frame, FrameError};
use shared::protocol::{
    decode_message, encode_message, AuthError, Message, ProtocolError, RoomAction, RoomError,
    RoomInfo,
};
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("server closed the connection")]
    ConnectionClosed,
    #[error("login rejected: {0}")]
    LoginRejected(AuthError),
    #[error("room request failed: {0}")]
    RoomRejected(RoomError),
    #[error("unexpected response message")]
    UnexpectedResponse,
}

/// One client connection. Each method sends a single request and waits
/// for its response before returning.
pub struct Connection {
    stream: TcpStream,
}

impl Connection {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        debug!("connected to {}", addr);
        Ok(Self { stream })
    }

    /// Logs in, binding `username` to this connection on the server side.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .request(Message::LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        match response {
            Message::LoginResponse { success: true, .. } => Ok(()),
            Message::LoginResponse {
                error: Some(error), ..
            } => Err(ClientError::LoginRejected(error)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn create_room(&mut self) -> Result<RoomInfo, ClientError> {
        self.room_request(RoomAction::CreateRoom, None).await
    }

    pub async fn join_room(&mut self, room_id: &str) -> Result<RoomInfo, ClientError> {
        self.room_request(RoomAction::JoinRoom, Some(room_id.to_string()))
            .await
    }

    pub async fn start_game(&mut self, room_id: &str) -> Result<RoomInfo, ClientError> {
        self.room_request(RoomAction::StartGame, Some(room_id.to_string()))
            .await
    }

    async fn room_request(
        &mut self,
        action: RoomAction,
        room_id: Option<String>,
    ) -> Result<RoomInfo, ClientError> {
        let response = self.request(Message::RoomRequest { action, room_id }).await?;

        match response {
            Message::RoomResponse {
                success: true,
                room_info: Some(info),
                ..
            } => Ok(info),
            Message::RoomResponse {
                error: Some(error), ..
            } => Err(ClientError::RoomRejected(error)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    /// Sends one raw request message and returns the response envelope.
    pub async fn request(&mut self, message: Message) -> Result<Message, ClientError> {
        let encoded = encode_message(&message)?;
        write_frame(&mut self.stream, &encoded).await?;

        match read_frame(&mut self.stream).await? {
            Some(payload) => Ok(decode_message(&payload)?),
            None => Err(ClientError::ConnectionClosed),
        }
    }
}
