//! What is true right now, from this client's point of view.

use std::fmt;

use time::OffsetDateTime;

use crate::protocol::{Color, GuessPayload, PlayerPayload, WordPayload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Landing,
    AwaitingCreateAck,
    AwaitingJoinAck,
    WaitingRoom,
    Playing,
    GameOver,
}

impl Phase {
    pub fn is_awaiting_ack(self) -> bool {
        matches!(self, Phase::AwaitingCreateAck | Phase::AwaitingJoinAck)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Landing => "landing",
            Phase::AwaitingCreateAck => "awaiting_create_ack",
            Phase::AwaitingJoinAck => "awaiting_join_ack",
            Phase::WaitingRoom => "waiting_room",
            Phase::Playing => "playing",
            Phase::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub color: Color,
    pub is_host: bool,
    pub is_guesser: bool,
}

impl Player {
    /// Placeholder for a name the client has not seen a full record for.
    fn named(name: String) -> Self {
        Self { name, color: Color::default(), is_host: false, is_guesser: false }
    }
}

impl From<PlayerPayload> for Player {
    fn from(p: PlayerPayload) -> Self {
        Self { name: p.name, color: p.color, is_host: p.is_host, is_guesser: p.is_guesser }
    }
}

/// A word in the shared sentence. Append-only until the session resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub color: Color,
    pub contributor_name: String,
}

impl From<WordPayload> for WordEntry {
    fn from(w: WordPayload) -> Self {
        Self { word: w.word, color: w.color, contributor_name: w.player }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessEntry {
    pub guess: String,
    pub color: Color,
    pub timestamp: OffsetDateTime,
}

impl From<GuessPayload> for GuessEntry {
    fn from(g: GuessPayload) -> Self {
        Self { guess: g.guess, color: g.color, timestamp: g.timestamp }
    }
}

/// Session state. Collections are always replaced wholesale from the latest
/// push, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub game_code: Option<String>,
    pub phase: Phase,
    /// Join order.
    pub players: Vec<Player>,
    pub current_turn_player_name: String,
    pub sentence: Vec<WordEntry>,
    pub guesses: Vec<GuessEntry>,
    pub score: u32,
    /// Only ever known to word-builders.
    pub subject: Option<String>,
    pub local_player_name: String,
    pub local_is_host: bool,
    pub local_is_guesser: bool,
    pub in_session: bool,
}

impl SessionState {
    /// Discards everything and lands in `phase`.
    pub fn reset(&mut self, phase: Phase) {
        *self = SessionState { phase, ..SessionState::default() };
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn is_local(&self, player: &Player) -> bool {
        player.name == self.local_player_name
    }

    /// True when exactly one entry of `roster` is the local player.
    pub fn roster_includes_local(&self, roster: &[Player]) -> bool {
        roster.iter().filter(|p| p.name == self.local_player_name).count() == 1
    }

    /// Rebuilds a roster from bare names, keeping what is already known
    /// about players that are still present.
    pub fn roster_from_names(&self, names: Vec<String>) -> Vec<Player> {
        names
            .into_iter()
            .map(|name| self.player(&name).cloned().unwrap_or_else(|| Player::named(name)))
            .collect()
    }
}

/// Whether `name` belongs to a word-builder (non-guesser) in `roster`.
pub fn is_word_builder(roster: &[Player], name: &str) -> bool {
    roster.iter().any(|p| p.name == name && !p.is_guesser)
}

pub fn roster_from(players: Vec<PlayerPayload>) -> Vec<Player> {
    players.into_iter().map(Player::from).collect()
}
