//! Presentation collaborators. The session never draws anything itself; it
//! hands snapshots to a [`Renderer`].

use crate::session::{FinalReport, InputError, Notice, SessionState, ViewFacts};

mod text;

pub use text::TextRenderer;

pub trait Renderer {
    /// Projects the whole state. Called after every applied mutation.
    fn render(&mut self, state: &SessionState, view: &ViewFacts);

    /// The results screen, shown once when a game ends.
    fn game_over(&mut self, report: &FinalReport);

    fn notice(&mut self, notice: &Notice);

    fn input_rejected(&mut self, err: &InputError);

    /// A yes/no question; the next line the user enters answers it.
    fn prompt(&mut self, question: &str);

    /// Free-form feedback (help text, connection status).
    fn message(&mut self, text: &str);
}
