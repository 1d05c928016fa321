use clap::Parser;
use server::acceptor::Server;
use server::auth::AllowAny;
use server::registry::{RoomConfig, RoomRegistry};
use std::sync::Arc;

/// Main-method of the application.
/// Parses command-line arguments, builds the shared room registry, and
/// runs the accept loop until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = shared::DEFAULT_HOST)]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value_t = shared::DEFAULT_PORT)]
        port: u16,
        /// Maximum players per room
        #[clap(long, default_value_t = RoomConfig::default().capacity)]
        capacity: usize,
        /// Minimum players required to start a game
        #[clap(long, default_value_t = RoomConfig::default().min_players)]
        min_players: usize,
    }

    env_logger::init();
    let args = Args::parse();

    let config = RoomConfig {
        capacity: args.capacity,
        min_players: args.min_players,
    };
    let registry = Arc::new(RoomRegistry::new(config));

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, registry, Arc::new(AllowAny)).await?;

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
