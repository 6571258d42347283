use std::io::{self, Stdout, Write};

use time::macros::format_description;
use time::UtcOffset;

use super::Renderer;
use crate::session::{
    FinalReport, GuessEntry, InputError, Notice, Phase, Player, SessionState, ViewFacts,
};

/// Line-oriented terminal view. Each render prints a full snapshot.
pub struct TextRenderer<W: Write> {
    out: W,
    offset: UtcOffset,
}

impl TextRenderer<Stdout> {
    /// Writes to stdout, showing guess times in the local timezone when it
    /// can be determined.
    pub fn stdout() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Self { out: io::stdout(), offset }
    }
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, offset: UtcOffset::UTC }
    }

    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn clock(&self, entry: &GuessEntry) -> String {
        entry
            .timestamp
            .to_offset(self.offset)
            .format(format_description!("[hour]:[minute]:[second]"))
            .unwrap_or_default()
    }

    fn roster(&mut self, state: &SessionState) {
        let _ = writeln!(self.out, "Players:");
        for player in &state.players {
            let line = roster_line(state, player);
            let _ = writeln!(self.out, "{line}");
        }
    }

    fn guesses(&mut self, guesses: &[GuessEntry]) {
        if guesses.is_empty() {
            return;
        }
        let _ = writeln!(self.out, "Guesses:");
        for entry in guesses {
            let clock = self.clock(entry);
            let _ = writeln!(self.out, "  [{clock}] {}", entry.guess);
        }
    }
}

fn roster_line(state: &SessionState, player: &Player) -> String {
    let playing = state.phase == Phase::Playing;
    let marker = if playing && player.name == state.current_turn_player_name { '>' } else { ' ' };
    let mut line = format!("{marker} {}", player.name);
    if playing {
        line.push_str(if player.is_guesser { " [guesser]" } else { " [builder]" });
    }
    if player.is_host {
        line.push_str(" (Host)");
    }
    if state.is_local(player) {
        line.push_str(" (You)");
    }
    line
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, state: &SessionState, view: &ViewFacts) {
        let _ = writeln!(self.out);
        match state.phase {
            Phase::Landing => {
                let _ = writeln!(self.out, "== Word Builder ==");
                let _ = writeln!(
                    self.out,
                    "Type `create <name>` to host a game or `join <code> <name>` to join one."
                );
            }
            Phase::AwaitingCreateAck => {
                let _ = writeln!(self.out, "Creating a game as {}...", state.local_player_name);
            }
            Phase::AwaitingJoinAck => {
                let _ = writeln!(self.out, "Joining the game as {}...", state.local_player_name);
            }
            Phase::WaitingRoom => {
                let code = state.game_code.as_deref().unwrap_or("?");
                let _ = writeln!(self.out, "Game code: {code}");
                if state.local_is_host {
                    let _ = writeln!(
                        self.out,
                        "Game created! You've joined as {} (Host)",
                        state.local_player_name
                    );
                } else {
                    let _ = writeln!(
                        self.out,
                        "Joined as {}. Waiting for the host to start the game.",
                        state.local_player_name
                    );
                }
                self.roster(state);
                if state.local_is_host {
                    let _ = writeln!(self.out, "Type `start` when everyone is here.");
                }
            }
            Phase::Playing => {
                self.roster(state);
                let sentence = state
                    .sentence
                    .iter()
                    .map(|w| format!("{}({})", w.word, w.contributor_name))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(self.out, "Sentence: {sentence}");
                self.guesses(&state.guesses);
                let _ = writeln!(self.out, "Score: {}", state.score);
                if let Some(status) = &view.status_message {
                    let _ = writeln!(self.out, "{status}");
                }
                if view.can_submit_word {
                    let _ = writeln!(self.out, "Add your word with `word <word>`.");
                }
                if view.can_submit_guess {
                    let _ = writeln!(self.out, "Guess the subject with `guess <text>`.");
                }
            }
            Phase::GameOver => {
                let _ = writeln!(self.out, "Type `new` to return to the lobby.");
            }
        }
        let _ = self.out.flush();
    }

    fn game_over(&mut self, report: &FinalReport) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "== Game Over ==");
        let _ = writeln!(self.out, "Winner: {}", report.winner);
        let _ = writeln!(self.out, "Subject: {}", report.subject);
        let _ = writeln!(self.out, "Sentence: {}", report.sentence);
        let _ = writeln!(self.out, "Final score: {}", report.score);
        if let Some(scores) = &report.scores {
            for (name, score) in scores {
                let _ = writeln!(self.out, "  {name}: {score}");
            }
        }
        self.guesses(&report.guesses);
        let _ = self.out.flush();
    }

    fn notice(&mut self, notice: &Notice) {
        let _ = writeln!(self.out, "! {notice}");
        let _ = self.out.flush();
    }

    fn input_rejected(&mut self, err: &InputError) {
        let _ = writeln!(self.out, "! {err}");
        let _ = self.out.flush();
    }

    fn prompt(&mut self, question: &str) {
        let _ = writeln!(self.out, "{question} (y/n)");
        let _ = self.out.flush();
    }

    fn message(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}
