#![allow(dead_code)]

use std::time::Duration;

use tokio::sync::mpsc;
use wordbuilder::client::{Client, Flow};
use wordbuilder::protocol::{Color, Inbound, Outbound, PlayerPayload};
use wordbuilder::render::Renderer;
use wordbuilder::session::{FinalReport, InputError, Notice, Phase, SessionState, ViewFacts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Render(SessionState, ViewFacts),
    GameOver(FinalReport),
    Notice(Notice),
    Rejected(InputError),
    Prompt(String),
    Message(String),
}

impl Shown {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Shown::Render(state, _) => Some(state.phase),
            _ => None,
        }
    }
}

/// Forwards everything it is asked to show into a channel, so tests can
/// observe a renderer after it has been moved into a `Client` or the driver.
pub struct RecordingRenderer {
    tx: mpsc::UnboundedSender<Shown>,
}

impl RecordingRenderer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Shown>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn push(&self, shown: Shown) {
        let _ = self.tx.send(shown);
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, state: &SessionState, view: &ViewFacts) {
        self.push(Shown::Render(state.clone(), view.clone()));
    }

    fn game_over(&mut self, report: &FinalReport) {
        self.push(Shown::GameOver(report.clone()));
    }

    fn notice(&mut self, notice: &Notice) {
        self.push(Shown::Notice(notice.clone()));
    }

    fn input_rejected(&mut self, err: &InputError) {
        self.push(Shown::Rejected(err.clone()));
    }

    fn prompt(&mut self, question: &str) {
        self.push(Shown::Prompt(question.to_string()));
    }

    fn message(&mut self, text: &str) {
        self.push(Shown::Message(text.to_string()));
    }
}

/// A `Client` wired to channels in place of a transport.
pub struct Harness {
    pub client: Client<RecordingRenderer>,
    sent: Option<mpsc::UnboundedReceiver<Outbound>>,
    shown: mpsc::UnboundedReceiver<Shown>,
}

impl Harness {
    pub fn new() -> Self {
        let mut harness = Self::offline();
        let (tx, sent) = mpsc::unbounded_channel();
        harness.client.set_outbound(Some(tx));
        harness.sent = Some(sent);
        harness
    }

    /// No transport sender installed yet.
    pub fn offline() -> Self {
        let (renderer, shown) = RecordingRenderer::new();
        Self { client: Client::new(renderer), sent: None, shown }
    }

    /// Drops the receiving end, as when the writer task has gone away.
    pub fn hang_up(&mut self) {
        self.sent = None;
    }

    pub fn line(&mut self, line: &str) -> Flow {
        self.client.handle_line(line)
    }

    pub fn event(&mut self, event: Inbound) {
        self.client.handle_event(event);
    }

    pub fn sent(&mut self) -> Vec<Outbound> {
        let mut sent = Vec::new();
        if let Some(rx) = self.sent.as_mut() {
            while let Ok(msg) = rx.try_recv() {
                sent.push(msg);
            }
        }
        sent
    }

    pub fn shown(&mut self) -> Vec<Shown> {
        drain(&mut self.shown)
    }

    pub fn state(&self) -> &SessionState {
        self.client.controller().state()
    }

    pub fn status(&self) -> Option<String> {
        self.client.controller().view().status_message
    }
}

/// Everything shown so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Shown>) -> Vec<Shown> {
    let mut shown = Vec::new();
    while let Ok(s) = rx.try_recv() {
        shown.push(s);
    }
    shown
}

/// Waits until something matching `pred` is shown.
pub async fn wait_for<F>(rx: &mut mpsc::UnboundedReceiver<Shown>, mut pred: F) -> Shown
where
    F: FnMut(&Shown) -> bool,
{
    let found = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(shown) = rx.recv().await {
            if pred(&shown) {
                return Some(shown);
            }
        }
        None
    })
    .await;
    match found {
        Ok(Some(shown)) => shown,
        Ok(None) => panic!("renderer dropped before the expected output"),
        Err(_) => panic!("timed out waiting for renderer output"),
    }
}

pub fn player(name: &str, is_host: bool, is_guesser: bool) -> PlayerPayload {
    PlayerPayload {
        name: name.into(),
        color: Color(format!("#{:06x}", name.len() * 0x3355)),
        is_host,
        is_guesser,
    }
}
