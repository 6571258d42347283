//! Turn/role synchronization: which local inputs are open, and what the
//! turn status line says. Recomputed from scratch after every mutation.

use super::state::{Phase, SessionState};

/// Shown to the guesser while word-builders take turns.
pub const GUESSER_ADVISORY: &str = "Wait for others to build the sentence";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFacts {
    pub can_submit_word: bool,
    pub can_submit_guess: bool,
    /// `None` outside of play.
    pub status_message: Option<String>,
}

pub fn derive(state: &SessionState) -> ViewFacts {
    let playing = state.phase == Phase::Playing;
    ViewFacts {
        can_submit_word: playing
            && !state.local_is_guesser
            && state.current_turn_player_name == state.local_player_name,
        can_submit_guess: playing && state.local_is_guesser,
        status_message: playing.then(|| status_message(state)),
    }
}

fn status_message(state: &SessionState) -> String {
    // The guesser may act on any turn, so there is no "your turn" for them.
    if state.local_is_guesser {
        return GUESSER_ADVISORY.to_string();
    }
    let turn = if state.current_turn_player_name == state.local_player_name {
        "It's your turn to add a word!".to_string()
    } else {
        format!("Waiting for {} to add a word...", state.current_turn_player_name)
    };
    match &state.subject {
        Some(subject) => format!("The subject is: \"{subject}\"\n{turn}"),
        None => turn,
    }
}
