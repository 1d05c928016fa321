//! Scripted smoke client exercising the lobby protocol end to end.
//!
//! Drives two connections against a running server: player1 logs in and
//! creates a room, player2 logs in and joins it, then player1 starts the
//! game. Run the server first, then `cargo run --bin test_client`.

use shared::framing::{read_frame, write_frame};
use shared::protocol::{decode_message, encode_message, Message, RoomAction};
use tokio::net::TcpStream;

async fn request(
    stream: &mut TcpStream,
    message: &Message,
) -> Result<Message, Box<dyn std::error::Error>> {
    write_frame(stream, &encode_message(message)?).await?;
    match read_frame(stream).await? {
        Some(payload) => Ok(decode_message(&payload)?),
        None => Err("server closed the connection".into()),
    }
}

async fn login(
    stream: &mut TcpStream,
    username: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = request(
        stream,
        &Message::LoginRequest {
            username: username.to_string(),
            password: "123".to_string(),
        },
    )
    .await?;
    println!("{} login response: {:?}", username, response);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr = format!("{}:{}", shared::DEFAULT_HOST, shared::DEFAULT_PORT);
    println!("=== lobby smoke test against {} ===", server_addr);

    // Player 1: log in and create a room.
    let mut sock1 = TcpStream::connect(&server_addr).await?;
    login(&mut sock1, "player1").await?;

    let create_resp = request(
        &mut sock1,
        &Message::RoomRequest {
            action: RoomAction::CreateRoom,
            room_id: None,
        },
    )
    .await?;
    let room_id = match &create_resp {
        Message::RoomResponse {
            room_info: Some(info),
            ..
        } => info.room_id.clone(),
        other => return Err(format!("unexpected create response: {:?}", other).into()),
    };
    println!("player1 created room {}", room_id);

    // Player 2: log in and join the room.
    let mut sock2 = TcpStream::connect(&server_addr).await?;
    login(&mut sock2, "player2").await?;

    let join_resp = request(
        &mut sock2,
        &Message::RoomRequest {
            action: RoomAction::JoinRoom,
            room_id: Some(room_id.clone()),
        },
    )
    .await?;
    println!("player2 join response: {:?}", join_resp);

    // Player 1: start the game.
    let start_resp = request(
        &mut sock1,
        &Message::RoomRequest {
            action: RoomAction::StartGame,
            room_id: Some(room_id),
        },
    )
    .await?;
    println!("player1 start response: {:?}", start_resp);

    println!("Test client finished");
    Ok(())
}
