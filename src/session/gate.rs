//! Input gate: shape checks for local input and duplicate-submit guards
//! for the create/join forms.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Word,
    Guess,
    PlayerName,
    GameCode,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Word => "word",
            Field::Guess => "guess",
            Field::PlayerName => "player name",
            Field::GameCode => "game code",
        })
    }
}

/// Malformed local input. Never sent to the authority.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(Field),
    #[error("{field} cannot contain {ch:?}")]
    IllegalCharacter { field: Field, ch: char },
}

/// Local actions the gate can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Join,
    Start,
    SubmitWord,
    SubmitGuess,
    NewGame,
    Leave,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Create => "create a game",
            Action::Join => "join a game",
            Action::Start => "start the game",
            Action::SubmitWord => "add a word",
            Action::SubmitGuess => "guess",
            Action::NewGame => "start a new game",
            Action::Leave => "leave the game",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Join,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormKind::Create => "create",
            FormKind::Join => "join",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("you cannot {0} right now")]
    NotPermitted(Action),
    #[error("still waiting for the server to answer the {0} request")]
    Pending(FormKind),
}

/// Editable/disabled state of the create and join forms. A form is disabled
/// from submission until an `error` re-enables it or the session resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Forms {
    create_pending: bool,
    join_pending: bool,
}

impl Forms {
    pub fn is_pending(&self, kind: FormKind) -> bool {
        match kind {
            FormKind::Create => self.create_pending,
            FormKind::Join => self.join_pending,
        }
    }

    pub fn pending(&self) -> Option<FormKind> {
        if self.create_pending {
            Some(FormKind::Create)
        } else if self.join_pending {
            Some(FormKind::Join)
        } else {
            None
        }
    }

    pub fn disable(&mut self, kind: FormKind) {
        match kind {
            FormKind::Create => self.create_pending = true,
            FormKind::Join => self.join_pending = true,
        }
    }

    /// Re-enables whichever form is disabled and reports it.
    pub fn reenable(&mut self) -> Option<FormKind> {
        let pending = self.pending();
        *self = Forms::default();
        pending
    }
}

/// Keystroke filter for the word field: ASCII letters only.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Trims a word. Empty input is a no-op (`Ok(None)`), anything that is not
/// a letter is refused.
pub fn validate_word(raw: &str) -> Result<Option<String>, ValidationError> {
    let word = raw.trim();
    if word.is_empty() {
        return Ok(None);
    }
    if let Some(ch) = word.chars().find(|c| !is_word_char(*c)) {
        return Err(ValidationError::IllegalCharacter { field: Field::Word, ch });
    }
    Ok(Some(word.to_string()))
}

/// Guesses may be any phrase; only blank input is dropped.
pub fn validate_guess(raw: &str) -> Option<String> {
    let guess = raw.trim();
    (!guess.is_empty()).then(|| guess.to_string())
}

pub fn validate_player_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty(Field::PlayerName));
    }
    Ok(name.to_string())
}

pub fn validate_game_code(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(ValidationError::Empty(Field::GameCode));
    }
    if let Some(ch) = code.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(ValidationError::IllegalCharacter { field: Field::GameCode, ch });
    }
    Ok(code.to_string())
}
