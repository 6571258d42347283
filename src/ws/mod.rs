//! Websocket transport to the game authority.

pub mod connection;

pub use connection::{connect, Connection};

use crate::protocol::ProtocolError;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("server refused the connection: {0}")]
    Rejected(String),
    #[error("connection closed")]
    Closed,
}
