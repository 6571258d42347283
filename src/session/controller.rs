//! Session controller: the phase state machine.
//!
//! Local actions pass through the input gate and produce the [`Outbound`]
//! event to send; they never move the session forward on their own. Phase
//! changes come only from inbound events, each checked against the current
//! phase first. An event the current phase does not expect is dropped
//! (duplicate or late delivery), except `error` and `disconnect`, which are
//! accepted everywhere.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::protocol::{
    ErrorPayload, GameEndedPayload, GameStartedPayload, GuessResultPayload, Inbound,
    Outbound, PlayerLeftPayload, RosterPayload, SentenceUpdatedPayload,
};

use super::gate::{self, Action, FormKind, Forms, InputError};
use super::state::{self, GuessEntry, Phase, SessionState, WordEntry};
use super::sync::{self, ViewFacts};

/// Something the user has to be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The authority refused the last request.
    Rejected(String),
    /// The connection dropped while in a session.
    Disconnected,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Rejected(message) => f.write_str(message),
            Notice::Disconnected => f.write_str("You have been disconnected from the game."),
        }
    }
}

/// Terminal snapshot captured from `game_ended` before the state is reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReport {
    pub winner: String,
    pub subject: String,
    pub sentence: String,
    pub score: u32,
    pub guesses: Vec<GuessEntry>,
    pub scores: Option<BTreeMap<String, u32>>,
}

impl From<GameEndedPayload> for FinalReport {
    fn from(p: GameEndedPayload) -> Self {
        Self {
            winner: p.winner,
            subject: p.subject,
            sentence: p.sentence,
            score: p.score,
            guesses: p.guesses.into_iter().map(GuessEntry::from).collect(),
            scores: p.scores,
        }
    }
}

/// Result of applying one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not valid in the current phase; nothing changed.
    Ignored,
    Applied(Update),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub from: Phase,
    pub to: Phase,
    pub notice: Option<Notice>,
    /// Present only for `game_ended`; the state it describes is already gone.
    pub report: Option<FinalReport>,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

#[derive(Default)]
struct Effects {
    notice: Option<Notice>,
    report: Option<FinalReport>,
}

#[derive(Debug, Default)]
pub struct SessionController {
    state: SessionState,
    forms: Forms,
    report: Option<FinalReport>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn forms(&self) -> Forms {
        self.forms
    }

    /// Report of the game that just ended, kept for display in GAME_OVER.
    pub fn report(&self) -> Option<&FinalReport> {
        self.report.as_ref()
    }

    pub fn view(&self) -> ViewFacts {
        sync::derive(&self.state)
    }

    // ========== Local actions ==========

    pub fn submit_create(&mut self, player_name: &str) -> Result<Outbound, InputError> {
        self.check_lobby_form(Action::Create)?;
        let player_name = gate::validate_player_name(player_name)?;
        self.forms.disable(FormKind::Create);
        self.state.local_player_name = player_name.clone();
        self.enter(Phase::AwaitingCreateAck);
        Ok(Outbound::CreateGame { player_name })
    }

    pub fn submit_join(&mut self, game_code: &str, player_name: &str) -> Result<Outbound, InputError> {
        self.check_lobby_form(Action::Join)?;
        let game_code = gate::validate_game_code(game_code)?;
        let player_name = gate::validate_player_name(player_name)?;
        self.forms.disable(FormKind::Join);
        self.state.local_player_name = player_name.clone();
        self.enter(Phase::AwaitingJoinAck);
        Ok(Outbound::JoinGame { game_code, player_name })
    }

    /// Whether `action` is open right now. Shape checks on the input itself
    /// still run on submission.
    pub fn permits(&self, action: Action) -> bool {
        match action {
            Action::Create | Action::Join => self.check_lobby_form(action).is_ok(),
            Action::Start => self.state.phase == Phase::WaitingRoom && self.state.local_is_host,
            Action::SubmitWord => self.view().can_submit_word,
            Action::SubmitGuess => self.view().can_submit_guess,
            Action::NewGame => self.state.phase == Phase::GameOver,
            Action::Leave => self.state.in_session || self.state.phase == Phase::GameOver,
        }
    }

    fn require(&self, action: Action) -> Result<(), InputError> {
        if self.permits(action) {
            Ok(())
        } else {
            Err(InputError::NotPermitted(action))
        }
    }

    /// Host only. The phase stays put until `game_started` arrives.
    pub fn start_game(&self) -> Result<Outbound, InputError> {
        self.require(Action::Start)?;
        Ok(Outbound::StartGame)
    }

    /// `Ok(None)` when the trimmed input is empty.
    pub fn submit_word(&self, raw: &str) -> Result<Option<Outbound>, InputError> {
        self.require(Action::SubmitWord)?;
        Ok(gate::validate_word(raw)?.map(|word| Outbound::AddWord { word }))
    }

    /// `Ok(None)` when the trimmed input is empty.
    pub fn submit_guess(&self, raw: &str) -> Result<Option<Outbound>, InputError> {
        self.require(Action::SubmitGuess)?;
        Ok(gate::validate_guess(raw).map(|guess| Outbound::MakeGuess { guess }))
    }

    /// Leaves GAME_OVER for LANDING once the user has confirmed. Returns
    /// whether the reset happened.
    pub fn confirm_new_game(&mut self, confirmed: bool) -> Result<bool, InputError> {
        self.require(Action::NewGame)?;
        if !confirmed {
            return Ok(false);
        }
        self.reset(Phase::Landing);
        Ok(true)
    }

    /// Abandons the current session, or the results of the last one, once the
    /// user has confirmed. The caller is expected to drop the connection so
    /// the authority frees the seat.
    pub fn leave(&mut self, confirmed: bool) -> Result<bool, InputError> {
        self.require(Action::Leave)?;
        if !confirmed {
            return Ok(false);
        }
        self.reset(Phase::Landing);
        Ok(true)
    }

    fn check_lobby_form(&self, action: Action) -> Result<(), InputError> {
        if let Some(pending) = self.forms.pending() {
            return Err(InputError::Pending(pending));
        }
        let open = matches!(self.state.phase, Phase::Landing) || self.state.phase.is_awaiting_ack();
        if self.state.in_session || !open {
            return Err(InputError::NotPermitted(action));
        }
        Ok(())
    }

    // ========== Inbound events ==========

    pub fn apply(&mut self, event: Inbound) -> Outcome {
        let from = self.state.phase;
        let name = event.name();
        let effects = match event {
            Inbound::GameCreated(p) => self.on_game_created(p),
            Inbound::PlayerJoined(p) => self.on_player_joined(p),
            Inbound::PlayerLeft(p) => self.on_player_left(p),
            Inbound::GameStarted(p) => self.on_game_started(p),
            Inbound::SentenceUpdated(p) => self.on_sentence_updated(p),
            Inbound::GuessResult(p) => self.on_guess_result(p),
            Inbound::GameEnded(p) => self.on_game_ended(p),
            Inbound::Error(p) => Some(self.on_error(p)),
            Inbound::Disconnect => self.on_disconnect(),
        };
        match effects {
            Some(Effects { notice, report }) => Outcome::Applied(Update {
                from,
                to: self.state.phase,
                notice,
                report,
            }),
            None => {
                debug!(event = name, phase = %from, "ignoring event not expected in this phase");
                Outcome::Ignored
            }
        }
    }

    fn on_game_created(&mut self, p: RosterPayload) -> Option<Effects> {
        if self.state.phase != Phase::AwaitingCreateAck {
            return None;
        }
        let players = state::roster_from(p.players);
        if !self.state.roster_includes_local(&players) {
            return None;
        }
        self.state.game_code = Some(p.game_code);
        self.state.local_is_host = true;
        self.state.players = players;
        self.state.in_session = true;
        self.forms = Forms::default();
        self.enter(Phase::WaitingRoom);
        Some(Effects::default())
    }

    fn on_player_joined(&mut self, p: RosterPayload) -> Option<Effects> {
        let players = state::roster_from(p.players);
        if !self.state.roster_includes_local(&players) {
            return None;
        }
        match self.state.phase {
            Phase::AwaitingJoinAck => {
                self.state.game_code = Some(p.game_code);
                self.state.local_is_host = false;
                self.state.players = players;
                self.state.in_session = true;
                self.forms = Forms::default();
                self.enter(Phase::WaitingRoom);
            }
            Phase::WaitingRoom => self.state.players = players,
            _ => return None,
        }
        Some(Effects::default())
    }

    fn on_player_left(&mut self, p: PlayerLeftPayload) -> Option<Effects> {
        if self.state.phase != Phase::WaitingRoom {
            return None;
        }
        let players = self.state.roster_from_names(p.players);
        if !self.state.roster_includes_local(&players) {
            return None;
        }
        self.state.players = players;
        Some(Effects::default())
    }

    /// Also accepted before the create/join ack when the start overtakes it.
    /// A start overtaking `game_created` leaves `game_code` unset for the
    /// match, since `game_started` does not carry it.
    fn on_game_started(&mut self, p: GameStartedPayload) -> Option<Effects> {
        let local_is_host = match self.state.phase {
            Phase::WaitingRoom => self.state.local_is_host,
            Phase::AwaitingCreateAck => true,
            Phase::AwaitingJoinAck => false,
            _ => return None,
        };
        let players = state::roster_from(p.players);
        if !self.state.roster_includes_local(&players)
            || !state::is_word_builder(&players, &p.current_turn)
        {
            return None;
        }
        self.state.local_is_host = local_is_host;
        self.state.local_is_guesser = p.is_guesser;
        self.state.current_turn_player_name = p.current_turn;
        self.state.subject = if p.is_guesser { None } else { p.subject };
        self.state.players = players;
        self.state.score = p.score;
        self.state.sentence.clear();
        self.state.guesses.clear();
        self.state.in_session = true;
        self.forms = Forms::default();
        self.enter(Phase::Playing);
        Some(Effects::default())
    }

    fn on_sentence_updated(&mut self, p: SentenceUpdatedPayload) -> Option<Effects> {
        if self.state.phase != Phase::Playing {
            return None;
        }
        let players = state::roster_from(p.players);
        if !self.state.roster_includes_local(&players)
            || !state::is_word_builder(&players, &p.current_turn)
        {
            return None;
        }
        self.state.sentence = p.sentence.into_iter().map(WordEntry::from).collect();
        self.state.current_turn_player_name = p.current_turn;
        self.state.players = players;
        self.state.score = p.score;
        // The authority broadcasts the subject to everyone; the guesser must
        // never hold it.
        if !self.state.local_is_guesser && p.subject.is_some() {
            self.state.subject = p.subject;
        }
        Some(Effects::default())
    }

    fn on_guess_result(&mut self, p: GuessResultPayload) -> Option<Effects> {
        if self.state.phase != Phase::Playing {
            return None;
        }
        self.state.guesses = p.guesses.into_iter().map(GuessEntry::from).collect();
        if let Some(players) = p.players.map(state::roster_from) {
            if self.state.roster_includes_local(&players) {
                self.state.players = players;
            }
        }
        if let Some(score) = p.score {
            self.state.score = score;
        }
        Some(Effects::default())
    }

    fn on_game_ended(&mut self, p: GameEndedPayload) -> Option<Effects> {
        if self.state.phase != Phase::Playing {
            return None;
        }
        let report = FinalReport::from(p);
        info!(winner = %report.winner, score = report.score, "game ended");
        self.reset(Phase::GameOver);
        self.report = Some(report.clone());
        Some(Effects { notice: None, report: Some(report) })
    }

    fn on_error(&mut self, p: ErrorPayload) -> Effects {
        if let Some(form) = self.forms.reenable() {
            debug!(%form, "re-enabled form after rejection");
        }
        Effects { notice: Some(Notice::Rejected(p.message)), report: None }
    }

    fn on_disconnect(&mut self) -> Option<Effects> {
        // A pending create/join can never be answered on a dead connection.
        if !self.state.in_session && !self.state.phase.is_awaiting_ack() {
            return None;
        }
        self.reset(Phase::Landing);
        Some(Effects { notice: Some(Notice::Disconnected), report: None })
    }

    // ========== Helpers ==========

    fn enter(&mut self, phase: Phase) {
        if self.state.phase != phase {
            info!(from = %self.state.phase, to = %phase, "phase change");
            self.state.phase = phase;
        }
    }

    /// Full reset: the state, both forms and any stale report.
    fn reset(&mut self, phase: Phase) {
        info!(from = %self.state.phase, to = %phase, "session reset");
        self.state.reset(phase);
        self.forms = Forms::default();
        self.report = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Color, GuessPayload, PlayerPayload, WordPayload};
    use time::macros::datetime;

    fn payload(name: &str, color: &str, is_host: bool, is_guesser: bool) -> PlayerPayload {
        PlayerPayload { name: name.into(), color: Color(color.into()), is_host, is_guesser }
    }

    fn lobby_roster() -> Vec<PlayerPayload> {
        vec![payload("Ava", "#f00", true, false), payload("Ben", "#0f0", false, false)]
    }

    fn game_roster() -> Vec<PlayerPayload> {
        vec![
            payload("Ava", "#f00", true, false),
            payload("Ben", "#0f0", false, false),
            payload("Cy", "#00f", false, true),
        ]
    }

    fn started(is_guesser: bool, turn: &str) -> Inbound {
        Inbound::GameStarted(GameStartedPayload {
            is_guesser,
            current_turn: turn.into(),
            subject: Some("lighthouse".into()),
            players: game_roster(),
            score: 0,
        })
    }

    fn sentence(words: &[(&str, &str)], turn: &str) -> Inbound {
        Inbound::SentenceUpdated(SentenceUpdatedPayload {
            sentence: words
                .iter()
                .map(|(word, player)| WordPayload {
                    word: (*word).into(),
                    color: Color("#f00".into()),
                    player: (*player).into(),
                })
                .collect(),
            current_turn: turn.into(),
            subject: Some("lighthouse".into()),
            players: game_roster(),
            score: 2,
        })
    }

    fn guess(text: &str) -> GuessPayload {
        GuessPayload {
            guess: text.into(),
            color: Color("#00f".into()),
            timestamp: datetime!(2024-05-01 10:00:00 UTC),
        }
    }

    fn ended() -> Inbound {
        Inbound::GameEnded(GameEndedPayload {
            winner: "Cy".into(),
            subject: "lighthouse".into(),
            sentence: "tall light by sea".into(),
            score: 10,
            guesses: vec![guess("tower"), guess("lighthouse")],
            scores: None,
        })
    }

    fn error(message: &str) -> Inbound {
        Inbound::Error(ErrorPayload { message: message.into() })
    }

    /// Host "Ava" sitting in the waiting room.
    fn hosting() -> SessionController {
        let mut controller = SessionController::new();
        controller.submit_create("Ava").unwrap();
        let outcome = controller.apply(Inbound::GameCreated(RosterPayload {
            game_code: "AB12".into(),
            players: vec![payload("Ava", "#f00", true, false)],
        }));
        assert!(outcome.is_applied());
        controller
    }

    fn joined_as(name: &str) -> SessionController {
        let mut controller = SessionController::new();
        controller.submit_join("AB12", name).unwrap();
        controller.apply(Inbound::PlayerJoined(RosterPayload {
            game_code: "AB12".into(),
            players: game_roster()
                .into_iter()
                .map(|p| PlayerPayload { is_guesser: false, ..p })
                .collect(),
        }));
        controller
    }

    #[test]
    fn create_then_ack_enters_waiting_room_as_host() {
        let mut controller = SessionController::new();
        let out = controller.submit_create("Ava").unwrap();
        assert_eq!(out, Outbound::CreateGame { player_name: "Ava".into() });
        assert_eq!(controller.state().phase, Phase::AwaitingCreateAck);
        assert!(controller.forms().is_pending(FormKind::Create));

        let outcome = controller.apply(Inbound::GameCreated(RosterPayload {
            game_code: "AB12".into(),
            players: vec![payload("Ava", "#f00", true, false)],
        }));
        assert_eq!(
            outcome,
            Outcome::Applied(Update {
                from: Phase::AwaitingCreateAck,
                to: Phase::WaitingRoom,
                notice: None,
                report: None,
            })
        );
        let state = controller.state();
        assert_eq!(state.game_code.as_deref(), Some("AB12"));
        assert!(state.local_is_host);
        assert!(state.in_session);
        assert_eq!(controller.forms().pending(), None);
    }

    #[test]
    fn duplicate_submit_is_refused_while_pending() {
        let mut controller = SessionController::new();
        controller.submit_join("AB12", "Ben").unwrap();
        assert_eq!(
            controller.submit_join("AB12", "Ben"),
            Err(InputError::Pending(FormKind::Join))
        );
        assert_eq!(
            controller.submit_create("Ben"),
            Err(InputError::Pending(FormKind::Join))
        );
    }

    #[test]
    fn invalid_form_input_sends_nothing_and_keeps_phase() {
        let mut controller = SessionController::new();
        assert!(matches!(
            controller.submit_join("", "Ben"),
            Err(InputError::Validation(_))
        ));
        assert_eq!(controller.state().phase, Phase::Landing);
        assert_eq!(controller.forms().pending(), None);
    }

    #[test]
    fn rejected_join_reenables_form_without_leaving_pending_phase() {
        let mut controller = SessionController::new();
        controller.submit_join("ZZ99", "Ben").unwrap();
        let outcome = controller.apply(error("Game not found"));
        let Outcome::Applied(update) = outcome else {
            panic!("error must always apply");
        };
        assert_eq!(update.to, Phase::AwaitingJoinAck);
        assert_eq!(update.notice, Some(Notice::Rejected("Game not found".into())));
        assert_eq!(controller.forms().pending(), None);

        // The user may act again.
        let retry = controller.submit_join("AB12", "Ben").unwrap();
        assert_eq!(
            retry,
            Outbound::JoinGame { game_code: "AB12".into(), player_name: "Ben".into() }
        );
    }

    #[test]
    fn player_joined_in_waiting_room_only_refreshes_roster() {
        let mut controller = hosting();
        let outcome = controller.apply(Inbound::PlayerJoined(RosterPayload {
            game_code: "AB12".into(),
            players: lobby_roster(),
        }));
        assert_eq!(
            outcome,
            Outcome::Applied(Update {
                from: Phase::WaitingRoom,
                to: Phase::WaitingRoom,
                notice: None,
                report: None,
            })
        );
        assert_eq!(controller.state().players.len(), 2);
        assert!(controller.state().local_is_host);
    }

    #[test]
    fn roster_without_local_player_is_ignored() {
        let mut controller = hosting();
        let outcome = controller.apply(Inbound::PlayerJoined(RosterPayload {
            game_code: "AB12".into(),
            players: vec![payload("Ben", "#0f0", false, false)],
        }));
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(controller.state().players.len(), 1);
    }

    #[test]
    fn player_left_keeps_details_of_remaining_players() {
        let mut controller = hosting();
        controller.apply(Inbound::PlayerJoined(RosterPayload {
            game_code: "AB12".into(),
            players: lobby_roster(),
        }));
        let outcome = controller.apply(Inbound::PlayerLeft(PlayerLeftPayload {
            players: vec!["Ava".into()],
        }));
        assert!(outcome.is_applied());
        let players = &controller.state().players;
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].color, Color("#f00".into()));
        assert!(players[0].is_host);
    }

    #[test]
    fn start_is_host_only_and_not_optimistic() {
        let controller = hosting();
        assert_eq!(controller.start_game(), Ok(Outbound::StartGame));
        assert_eq!(controller.state().phase, Phase::WaitingRoom);

        let guest = joined_as("Ben");
        assert_eq!(guest.start_game(), Err(InputError::NotPermitted(Action::Start)));
    }

    #[test]
    fn game_started_sets_roles_and_hides_subject_from_guesser() {
        let mut builder = joined_as("Ben");
        assert!(builder.apply(started(false, "Ava")).is_applied());
        let state = builder.state();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.subject.as_deref(), Some("lighthouse"));
        assert!(!state.local_is_guesser);

        let mut guesser = joined_as("Cy");
        assert!(guesser.apply(started(true, "Ava")).is_applied());
        assert!(guesser.state().local_is_guesser);
        assert_eq!(guesser.state().subject, None);

        // Broadcast sentence updates carry the subject; the guesser drops it.
        guesser.apply(sentence(&[("tall", "Ava")], "Ben"));
        assert_eq!(guesser.state().subject, None);
    }

    #[test]
    fn game_started_may_arrive_before_the_join_ack() {
        let mut controller = SessionController::new();
        controller.submit_join("AB12", "Ben").unwrap();
        assert!(controller.apply(started(false, "Ava")).is_applied());
        assert_eq!(controller.state().phase, Phase::Playing);
        assert!(controller.state().in_session);
        assert!(!controller.state().local_is_host);
    }

    #[test]
    fn turn_held_by_guesser_or_stranger_is_ignored() {
        let mut controller = joined_as("Ben");
        assert_eq!(controller.apply(started(false, "Cy")), Outcome::Ignored);
        assert_eq!(controller.apply(started(false, "Dee")), Outcome::Ignored);
        assert_eq!(controller.state().phase, Phase::WaitingRoom);

        controller.apply(started(false, "Ava"));
        assert_eq!(controller.apply(sentence(&[("tall", "Ava")], "Cy")), Outcome::Ignored);
        assert_eq!(controller.state().current_turn_player_name, "Ava");
    }

    #[test]
    fn sentence_update_is_idempotent() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        let update = sentence(&[("tall", "Ava"), ("light", "Ben")], "Ava");
        controller.apply(update.clone());
        let once = controller.state().clone();
        controller.apply(update);
        assert_eq!(controller.state(), &once);
        assert_eq!(once.sentence.len(), 2);
        assert_eq!(once.sentence[1].contributor_name, "Ben");
    }

    #[test]
    fn word_gate_follows_turn_order() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        assert_eq!(
            controller.submit_word("cat"),
            Err(InputError::NotPermitted(Action::SubmitWord))
        );
        controller.apply(sentence(&[("tall", "Ava")], "Ben"));
        assert_eq!(
            controller.submit_word(" cat "),
            Ok(Some(Outbound::AddWord { word: "cat".into() }))
        );
        assert_eq!(controller.submit_word("   "), Ok(None));
        assert!(matches!(
            controller.submit_word("c4t"),
            Err(InputError::Validation(_))
        ));
        assert_eq!(
            controller.submit_guess("tower"),
            Err(InputError::NotPermitted(Action::SubmitGuess))
        );
    }

    #[test]
    fn guess_result_replaces_history_wholesale() {
        let mut controller = joined_as("Cy");
        controller.apply(started(true, "Ava"));
        assert_eq!(
            controller.submit_guess(" a tall tower "),
            Ok(Some(Outbound::MakeGuess { guess: "a tall tower".into() }))
        );
        controller.apply(Inbound::GuessResult(GuessResultPayload {
            guesses: vec![guess("tower")],
            players: None,
            score: Some(1),
        }));
        controller.apply(Inbound::GuessResult(GuessResultPayload {
            guesses: vec![guess("tower"), guess("castle")],
            players: None,
            score: None,
        }));
        let state = controller.state();
        assert_eq!(state.guesses.len(), 2);
        assert_eq!(state.guesses[1].guess, "castle");
        assert_eq!(state.score, 1);
    }

    #[test]
    fn game_ended_hands_over_report_then_resets() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        let Outcome::Applied(update) = controller.apply(ended()) else {
            panic!("game_ended must apply while playing");
        };
        let report = update.report.expect("report");
        assert_eq!(report.winner, "Cy");
        assert_eq!(report.guesses.len(), 2);
        assert_eq!(
            controller.state(),
            &SessionState { phase: Phase::GameOver, ..SessionState::default() }
        );
        assert_eq!(controller.report(), Some(&report));
    }

    #[test]
    fn started_then_ended_then_confirmed_is_pristine() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        controller.apply(ended());
        assert_eq!(controller.confirm_new_game(false), Ok(false));
        assert_eq!(controller.state().phase, Phase::GameOver);
        assert_eq!(controller.confirm_new_game(true), Ok(true));
        assert_eq!(controller.state(), &SessionState::default());
        assert_eq!(controller.report(), None);
    }

    #[test]
    fn late_events_after_game_over_are_ignored() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        controller.apply(ended());
        assert_eq!(controller.apply(ended()), Outcome::Ignored);
        assert_eq!(controller.apply(sentence(&[("x", "Ava")], "Ava")), Outcome::Ignored);
        assert_eq!(controller.apply(Inbound::Disconnect), Outcome::Ignored);
        assert_eq!(controller.state().phase, Phase::GameOver);
    }

    #[test]
    fn disconnect_while_playing_resets_to_landing() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        let Outcome::Applied(update) = controller.apply(Inbound::Disconnect) else {
            panic!("disconnect must apply while in session");
        };
        assert_eq!(update.notice, Some(Notice::Disconnected));
        assert_eq!(controller.state(), &SessionState::default());
        assert!(!controller.state().in_session);
    }

    #[test]
    fn disconnect_on_landing_is_a_no_op() {
        let mut controller = SessionController::new();
        assert_eq!(controller.apply(Inbound::Disconnect), Outcome::Ignored);
    }

    #[test]
    fn disconnect_releases_an_unanswered_create() {
        let mut controller = SessionController::new();
        controller.submit_create("Ava").unwrap();
        assert!(controller.apply(Inbound::Disconnect).is_applied());
        assert_eq!(controller.state(), &SessionState::default());
        assert_eq!(controller.forms().pending(), None);
    }

    #[test]
    fn leave_requires_session_and_confirmation() {
        let mut controller = SessionController::new();
        assert_eq!(controller.leave(true), Err(InputError::NotPermitted(Action::Leave)));

        let mut controller = hosting();
        assert_eq!(controller.leave(false), Ok(false));
        assert_eq!(controller.state().phase, Phase::WaitingRoom);
        assert_eq!(controller.leave(true), Ok(true));
        assert_eq!(controller.state(), &SessionState::default());
    }

    #[test]
    fn leave_is_open_from_the_results() {
        let mut controller = joined_as("Ben");
        controller.apply(started(false, "Ava"));
        controller.apply(ended());
        assert!(!controller.state().in_session);
        assert!(controller.permits(Action::Leave));
        assert_eq!(controller.leave(true), Ok(true));
        assert_eq!(controller.state(), &SessionState::default());
        assert_eq!(controller.report(), None);
        assert!(!controller.permits(Action::Leave));
    }

    #[test]
    fn start_overtaking_the_create_ack_plays_without_a_code() {
        let mut controller = SessionController::new();
        controller.submit_create("Ava").unwrap();
        assert!(controller.apply(started(false, "Ava")).is_applied());
        let state = controller.state();
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.local_is_host);
        assert_eq!(state.game_code, None);

        // The late ack is stale by now.
        let late = controller.apply(Inbound::GameCreated(RosterPayload {
            game_code: "AB12".into(),
            players: vec![payload("Ava", "#f00", true, false)],
        }));
        assert_eq!(late, Outcome::Ignored);
    }

    #[test]
    fn lobby_forms_closed_once_in_session() {
        let mut controller = hosting();
        assert_eq!(
            controller.submit_join("AB12", "Ava"),
            Err(InputError::NotPermitted(Action::Join))
        );
        assert_eq!(
            controller.confirm_new_game(true),
            Err(InputError::NotPermitted(Action::NewGame))
        );
    }
}
