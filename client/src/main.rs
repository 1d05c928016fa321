use clap::Parser;
use client::Connection;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(long, default_value = shared::DEFAULT_HOST)]
    host: String,
    /// Server port to connect to
    #[arg(long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,
}

/// Scripted two-player lobby run: login, create, join, start.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let mut player1 = Connection::connect(&addr).await?;
    player1.login("player1", "123").await?;
    let room = player1.create_room().await?;
    println!(
        "player1 created room {} ({:?}, members {:?})",
        room.room_id, room.state, room.members
    );

    let mut player2 = Connection::connect(&addr).await?;
    player2.login("player2", "123").await?;
    let joined = player2.join_room(&room.room_id).await?;
    println!("player2 joined, members now {:?}", joined.members);

    let started = player1.start_game(&room.room_id).await?;
    println!("game started, room state {:?}", started.state);

    Ok(())
}
