//! Client-side session: state, the phase machine that drives it, and the
//! gate in front of local input.

pub mod controller;
pub mod gate;
pub mod state;
pub mod sync;

pub use controller::{FinalReport, Notice, Outcome, SessionController, Update};
pub use gate::{Action, FormKind, InputError, ValidationError};
pub use state::{GuessEntry, Phase, Player, SessionState, WordEntry};
pub use sync::ViewFacts;
