//! # Lobby Server Library
//!
//! This library implements the room/session management server for the
//! multiplayer card game. It accepts TCP connections, authenticates
//! clients, tracks per-connection session state, and arbitrates room
//! lifecycle (creation, joining, capacity, start-of-game) across many
//! simultaneously connected clients.
//!
//! ## Architecture
//!
//! One tokio task is spawned per accepted connection; each task owns its
//! socket and a [`session::Session`]. Shared state lives in a single
//! [`registry::RoomRegistry`] behind a mutex — constructed once at
//! startup and injected into every handler, never a global. Requests on a
//! connection are processed in arrival order; operations on a single room
//! are serialized by the registry lock.
//!
//! ## Module Organization
//!
//! - [`acceptor`] — TCP accept loop and the per-connection read/dispatch/
//!   respond cycle; framing errors close the connection, domain errors
//!   become structured failure responses.
//! - [`session`] — per-connection authentication state and request
//!   routing into the registry, including disconnect cleanup.
//! - [`registry`] — the room table and its lifecycle state machine
//!   (waiting, playing, closed), capacity enforcement, ownership
//!   transfer and eviction.
//! - [`auth`] — opaque credential-check boundary.
//! - [`game`] — fire-and-forget handoff point to the card-game rules
//!   engine once a room starts.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::acceptor::Server;
//! use server::auth::AllowAny;
//! use server::registry::{RoomConfig, RoomRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(RoomRegistry::new(RoomConfig::default()));
//!     let server = Server::bind("127.0.0.1:9527", registry, Arc::new(AllowAny)).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod acceptor;
pub mod auth;
pub mod game;
pub mod registry;
pub mod session;
