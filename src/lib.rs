//! Terminal client for a cooperative word-building guessing game.
//!
//! A game authority runs the rules. This crate mirrors its state for one
//! player: the [`session`] module holds the phase machine, [`ws`] talks to
//! the authority over Socket.IO, [`render`] projects the state, and
//! [`client`] wires them to user input.

pub mod client;
pub mod config;
pub mod protocol;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod ws;
