//! TCP acceptor and per-connection dispatch loop.
//!
//! One spawned task per accepted connection reads framed messages,
//! routes them through the session, and writes framed responses back on
//! the same connection. Requests from a single connection are processed
//! strictly in arrival order.

use log::{debug, error, info, warn};
use shared::framing::{read_frame, write_frame};
use shared::protocol::{decode_message, encode_message};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::auth::Authenticator;
use crate::registry::RoomRegistry;
use crate::session::Session;

pub struct Server {
    listener: TcpListener,
    registry: Arc<RoomRegistry>,
    authenticator: Arc<dyn Authenticator>,
}

impl Server {
    /// Binds the listener. The registry and authenticator are injected so
    /// tests can run one isolated instance per case.
    pub async fn bind(
        addr: &str,
        registry: Arc<RoomRegistry>,
        authenticator: Arc<dyn Authenticator>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("lobby server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            registry,
            authenticator,
        })
    }

    /// Actual bound address; lets tests bind port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Runs until the listener fails.
    pub async fn run(&self) -> io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!("accepted connection from {}", peer);

            let registry = Arc::clone(&self.registry);
            let authenticator = Arc::clone(&self.authenticator);
            tokio::spawn(async move {
                handle_connection(stream, peer, registry, authenticator).await;
            });
        }
    }
}

/// Drives one connection from accept to disconnect. Every exit path funnels
/// into the final `on_disconnect`, so room membership is always released.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<RoomRegistry>,
    authenticator: Arc<dyn Authenticator>,
) {
    let mut session = Session::new(registry, authenticator);
    let (mut reader, mut writer) = stream.into_split();

    loop {
        let payload = match read_frame(&mut reader).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("{} closed the connection", peer);
                break;
            }
            Err(e) => {
                warn!("framing error from {}: {}", peer, e);
                break;
            }
        };

        let message = match decode_message(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!("malformed message from {}: {}", peer, e);
                break;
            }
        };

        let response = match session.handle_message(message).await {
            Ok(response) => response,
            Err(e) => {
                warn!("protocol violation from {}: {}", peer, e);
                break;
            }
        };

        let encoded = match encode_message(&response) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("failed to encode response for {}: {}", peer, e);
                break;
            }
        };
        if let Err(e) = write_frame(&mut writer, &encoded).await {
            warn!("failed to write response to {}: {}", peer, e);
            break;
        }
    }

    session.on_disconnect().await;
}
