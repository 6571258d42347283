//! The driver: routes user lines and inbound events through the session
//! controller and keeps the renderer current.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::protocol::{Inbound, Outbound};
use crate::render::Renderer;
use crate::session::{Action, InputError, Outcome, SessionController};
use crate::ws::{self, Connection, TransportError};

pub mod command;

pub use command::{Command, CommandError, HELP};

/// Asked before abandoning a game, whether mid-session or from the results.
pub const LEAVE_QUESTION: &str = "Are you sure you want to leave the current game?";

pub const NOT_CONNECTED: &str = "Not connected to the server yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    NewGame,
    Leave,
}

impl Prompt {
    fn action(self) -> Action {
        match self {
            Prompt::NewGame => Action::NewGame,
            Prompt::Leave => Action::Leave,
        }
    }
}

/// What the driver loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Drop the connection and open a fresh one.
    Reconnect,
    Quit,
}

pub struct Client<R: Renderer> {
    controller: SessionController,
    renderer: R,
    outbound: Option<mpsc::UnboundedSender<Outbound>>,
    prompt: Option<Prompt>,
}

impl<R: Renderer> Client<R> {
    pub fn new(renderer: R) -> Self {
        Self { controller: SessionController::new(), renderer, outbound: None, prompt: None }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn set_outbound(&mut self, outbound: Option<mpsc::UnboundedSender<Outbound>>) {
        self.outbound = outbound;
    }

    /// True while a live transport sender is installed.
    pub fn is_connected(&self) -> bool {
        self.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    pub fn refresh(&mut self) {
        let view = self.controller.view();
        self.renderer.render(self.controller.state(), &view);
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        if let Some(prompt) = self.prompt.take() {
            return self.answer(prompt, command::is_yes(line));
        }
        match Command::parse(line) {
            Ok(Some(command)) => self.handle_command(command),
            Ok(None) => Flow::Continue,
            Err(err) => {
                self.renderer.message(&err.to_string());
                Flow::Continue
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Create { player_name } => {
                self.submit(|c| c.submit_create(&player_name).map(Some))
            }
            Command::Join { game_code, player_name } => {
                self.submit(|c| c.submit_join(&game_code, &player_name).map(Some))
            }
            Command::Start => self.submit(|c| c.start_game().map(Some)),
            Command::Word(raw) => self.submit(|c| c.submit_word(&raw)),
            Command::Guess(raw) => self.submit(|c| c.submit_guess(&raw)),
            Command::NewGame => self.ask(Prompt::NewGame),
            Command::Leave => self.ask(Prompt::Leave),
            Command::Help => {
                self.renderer.message(HELP);
                Flow::Continue
            }
            Command::Quit => Flow::Quit,
        }
    }

    /// Applies one inbound event and re-renders if anything changed.
    pub fn handle_event(&mut self, event: Inbound) {
        let Outcome::Applied(update) = self.controller.apply(event) else {
            return;
        };
        if let Some(report) = &update.report {
            self.renderer.game_over(report);
        }
        if let Some(notice) = &update.notice {
            self.renderer.notice(notice);
        }
        // A question the session has moved past must not eat the next line.
        if let Some(prompt) = self.prompt {
            if update.from != update.to || !self.controller.permits(prompt.action()) {
                debug!(?prompt, "withdrawing unanswered question");
                self.prompt = None;
            }
        }
        self.refresh();
    }

    fn submit<F>(&mut self, action: F) -> Flow
    where
        F: FnOnce(&mut SessionController) -> Result<Option<Outbound>, InputError>,
    {
        if !self.is_connected() {
            self.renderer.message(NOT_CONNECTED);
            return Flow::Continue;
        }
        let before = self.controller.state().phase;
        match action(&mut self.controller) {
            Ok(Some(msg)) => {
                debug!(event = msg.name(), "queueing");
                let sent = self.outbound.as_ref().is_some_and(|tx| tx.send(msg).is_ok());
                if !sent {
                    // The reader reports the disconnect; nothing else to do here.
                    warn!("transport is gone, event dropped");
                }
                if self.controller.state().phase != before {
                    self.refresh();
                }
            }
            Ok(None) => {}
            Err(err) => self.renderer.input_rejected(&err),
        }
        Flow::Continue
    }

    fn ask(&mut self, prompt: Prompt) -> Flow {
        if !self.controller.permits(prompt.action()) {
            self.renderer.input_rejected(&InputError::NotPermitted(prompt.action()));
            return Flow::Continue;
        }
        self.prompt = Some(prompt);
        self.renderer.prompt(LEAVE_QUESTION);
        Flow::Continue
    }

    fn answer(&mut self, prompt: Prompt, confirmed: bool) -> Flow {
        let result = match prompt {
            Prompt::NewGame => self.controller.confirm_new_game(confirmed),
            Prompt::Leave => self.controller.leave(confirmed),
        };
        match result {
            Ok(true) => {
                self.refresh();
                match prompt {
                    Prompt::NewGame => Flow::Continue,
                    Prompt::Leave => Flow::Reconnect,
                }
            }
            Ok(false) => Flow::Continue,
            Err(err) => {
                self.renderer.input_rejected(&err);
                Flow::Continue
            }
        }
    }
}

enum Ended {
    Quit,
    Left,
    Dropped,
}

/// Runs the client until the user quits or the server stays unreachable.
///
/// `lines` carries user input; closing it quits. The connection is reopened
/// after the user leaves a game and after it drops.
pub async fn run<R: Renderer>(
    settings: &Settings,
    mut lines: mpsc::UnboundedReceiver<String>,
    renderer: R,
) -> Result<(), TransportError> {
    let endpoint = settings.endpoint();
    let mut client = Client::new(renderer);
    let mut failures = 0;
    client.refresh();

    loop {
        let mut connection = match ws::connect(&endpoint).await {
            Ok(connection) => connection,
            Err(err) => {
                failures += 1;
                if failures >= settings.reconnect_attempts {
                    error!(%err, %endpoint, "giving up on the server");
                    return Err(err);
                }
                warn!(%err, attempt = failures, "connect failed, retrying");
                client
                    .renderer_mut()
                    .message(&format!("Could not reach the server ({err}), retrying..."));
                tokio::time::sleep(settings.reconnect_delay).await;
                continue;
            }
        };
        failures = 0;
        info!(sid = connection.sid(), "session transport ready");
        client.set_outbound(Some(connection.sender()));

        let ended = drive(&mut client, &mut connection, &mut lines).await;

        client.set_outbound(None);
        connection.close().await;
        match ended {
            Ended::Quit => return Ok(()),
            Ended::Left => debug!("reconnecting after leaving the game"),
            Ended::Dropped => tokio::time::sleep(settings.reconnect_delay).await,
        }
    }
}

/// One event or line at a time, each processed to completion.
async fn drive<R: Renderer>(
    client: &mut Client<R>,
    connection: &mut Connection,
    lines: &mut mpsc::UnboundedReceiver<String>,
) -> Ended {
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    return Ended::Quit;
                };
                match client.handle_line(&line) {
                    Flow::Continue => {}
                    Flow::Reconnect => return Ended::Left,
                    Flow::Quit => return Ended::Quit,
                }
            }
            event = connection.recv() => {
                let event = event.unwrap_or(Inbound::Disconnect);
                let dropped = event == Inbound::Disconnect;
                client.handle_event(event);
                if dropped {
                    return Ended::Dropped;
                }
            }
        }
    }
}
