//! # Lobby Client Library
//!
//! Thin protocol client for the lobby server. Wraps a TCP connection in
//! the request/response cycle the server expects: one framed request out,
//! one framed response back, on the same connection.
//!
//! Used by the scripted client binary and by the workspace integration
//! tests to drive real end-to-end scenarios.

pub mod connection;

pub use connection::{ClientError, Connection};
