//! Message contract between the client and the game authority.
//!
//! Every event travels as a Socket.IO event: a name plus a JSON object. The
//! enums below are adjacently tagged (`{"event": name, "data": payload}`) so
//! that the name/payload pair coming off the wire can be handed to serde
//! directly; see [`socketio`] for the framing around them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

pub mod socketio;
mod timestamp;

/// Opaque display token assigned to a player by the authority (a CSS color
/// in practice). Never interpreted by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("empty frame")]
    EmptyFrame,
    #[error("unknown packet type {0:?}")]
    UnknownPacket(char),
    #[error("unknown event {0:?}")]
    UnknownEvent(String),
    #[error("malformed event frame: {0}")]
    MalformedEvent(String),
    #[error("bad payload for {event}: {source}")]
    Payload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ========== Outbound ==========

/// Events sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Outbound {
    CreateGame { player_name: String },
    JoinGame { game_code: String, player_name: String },
    StartGame,
    AddWord { word: String },
    MakeGuess { guess: String },
}

impl Outbound {
    pub fn name(&self) -> &'static str {
        match self {
            Outbound::CreateGame { .. } => "create_game",
            Outbound::JoinGame { .. } => "join_game",
            Outbound::StartGame => "start_game",
            Outbound::AddWord { .. } => "add_word",
            Outbound::MakeGuess { .. } => "make_guess",
        }
    }

    /// Splits the message into its event name and payload object. Events
    /// without fields still carry an empty object, which is what the
    /// authority's handlers expect.
    pub fn to_event(&self) -> Result<(&'static str, Value), ProtocolError> {
        let mut tagged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => return Err(ProtocolError::MalformedEvent(other.to_string())),
        };
        let data = tagged
            .remove("data")
            .unwrap_or_else(|| Value::Object(Map::new()));
        Ok((self.name(), data))
    }
}

// ========== Inbound ==========

/// Roster entry as pushed by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub name: String,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub is_host: bool,
    #[serde(default)]
    pub is_guesser: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPayload {
    pub word: String,
    #[serde(default)]
    pub color: Color,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessPayload {
    pub guess: String,
    #[serde(default)]
    pub color: Color,
    #[serde(with = "timestamp")]
    pub timestamp: OffsetDateTime,
}

/// Payload of `game_created` and `player_joined`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPayload {
    pub game_code: String,
    pub players: Vec<PlayerPayload>,
}

/// `player_left` only carries the surviving names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLeftPayload {
    pub players: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartedPayload {
    pub is_guesser: bool,
    pub current_turn: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub players: Vec<PlayerPayload>,
    #[serde(default)]
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceUpdatedPayload {
    pub sentence: Vec<WordPayload>,
    pub current_turn: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub players: Vec<PlayerPayload>,
    #[serde(default)]
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResultPayload {
    pub guesses: Vec<GuessPayload>,
    #[serde(default)]
    pub players: Option<Vec<PlayerPayload>>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEndedPayload {
    pub winner: String,
    pub subject: String,
    pub sentence: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub guesses: Vec<GuessPayload>,
    /// Per-player totals, when the authority reports them.
    #[serde(default)]
    pub scores: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Events received by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Inbound {
    GameCreated(RosterPayload),
    PlayerJoined(RosterPayload),
    PlayerLeft(PlayerLeftPayload),
    GameStarted(GameStartedPayload),
    SentenceUpdated(SentenceUpdatedPayload),
    GuessResult(GuessResultPayload),
    GameEnded(GameEndedPayload),
    Error(ErrorPayload),
    /// Raised by the transport when the connection ends; never on the wire.
    #[serde(skip)]
    Disconnect,
}

const INBOUND_EVENTS: [&str; 8] = [
    "game_created",
    "player_joined",
    "player_left",
    "game_started",
    "sentence_updated",
    "guess_result",
    "game_ended",
    "error",
];

impl Inbound {
    pub fn name(&self) -> &'static str {
        match self {
            Inbound::GameCreated(_) => "game_created",
            Inbound::PlayerJoined(_) => "player_joined",
            Inbound::PlayerLeft(_) => "player_left",
            Inbound::GameStarted(_) => "game_started",
            Inbound::SentenceUpdated(_) => "sentence_updated",
            Inbound::GuessResult(_) => "guess_result",
            Inbound::GameEnded(_) => "game_ended",
            Inbound::Error(_) => "error",
            Inbound::Disconnect => "disconnect",
        }
    }

    /// Resolves a named event and its payload into an [`Inbound`].
    pub fn from_event(name: &str, data: Value) -> Result<Self, ProtocolError> {
        if !INBOUND_EVENTS.contains(&name) {
            return Err(ProtocolError::UnknownEvent(name.to_string()));
        }
        let mut tagged = Map::new();
        tagged.insert("event".into(), Value::String(name.to_string()));
        tagged.insert("data".into(), data);
        serde_json::from_value(Value::Object(tagged)).map_err(|source| ProtocolError::Payload {
            event: name.to_string(),
            source,
        })
    }
}
