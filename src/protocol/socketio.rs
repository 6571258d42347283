//! Engine.IO v4 / Socket.IO v5 text framing over a websocket.
//!
//! Engine.IO packet types: `0` open, `1` close, `2` ping, `3` pong,
//! `4` message, `6` noop. A message wraps a Socket.IO packet: `0` connect,
//! `1` disconnect, `2` event, `4` connect error. Only the default namespace
//! is used, so namespaces never appear in frames.

use serde::Deserialize;
use serde_json::Value;

use super::{ErrorPayload, Inbound, Outbound, ProtocolError};

/// Connect request for the default namespace.
pub const CONNECT: &str = "40";
/// Reply to an Engine.IO ping.
pub const PONG: &str = "3";

/// Engine.IO open packet contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Noop,
    Connected,
    NamespaceDisconnect,
    ConnectError(String),
    Event(Inbound),
}

/// Encodes an outbound event as `42["name",{...}]`.
pub fn encode_event(msg: &Outbound) -> Result<String, ProtocolError> {
    let (name, data) = msg.to_event()?;
    let body = serde_json::to_string(&(name, data))?;
    Ok(format!("42{body}"))
}

pub fn decode_frame(frame: &str) -> Result<Frame, ProtocolError> {
    let (kind, rest) = split_kind(frame)?;
    match kind {
        '0' => Ok(Frame::Open(serde_json::from_str(rest)?)),
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_message(rest),
        '6' => Ok(Frame::Noop),
        other => Err(ProtocolError::UnknownPacket(other)),
    }
}

fn split_kind(frame: &str) -> Result<(char, &str), ProtocolError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(ProtocolError::EmptyFrame)?;
    Ok((kind, chars.as_str()))
}

fn decode_message(body: &str) -> Result<Frame, ProtocolError> {
    let (kind, rest) = split_kind(body)?;
    match kind {
        '0' => Ok(Frame::Connected),
        '1' => Ok(Frame::NamespaceDisconnect),
        '2' => decode_event(rest).map(Frame::Event),
        '4' => {
            let message = serde_json::from_str::<ErrorPayload>(rest)
                .map(|p| p.message)
                .unwrap_or_else(|_| rest.to_string());
            Ok(Frame::ConnectError(message))
        }
        other => Err(ProtocolError::UnknownPacket(other)),
    }
}

fn decode_event(body: &str) -> Result<Inbound, ProtocolError> {
    // An ack id may precede the array: `2` + `12["name",{...}]`.
    let start = body
        .find('[')
        .ok_or_else(|| ProtocolError::MalformedEvent(body.to_string()))?;
    if !body[..start].bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedEvent(body.to_string()));
    }
    let mut parts: Vec<Value> = serde_json::from_str(&body[start..])?;
    if parts.is_empty() {
        return Err(ProtocolError::MalformedEvent(body.to_string()));
    }
    let name = match parts.remove(0) {
        Value::String(name) => name,
        other => return Err(ProtocolError::MalformedEvent(other.to_string())),
    };
    let data = if parts.is_empty() { Value::Null } else { parts.swap_remove(0) };
    Inbound::from_event(&name, data)
}
