//! Parsing of user input lines into commands.

use std::fmt;

pub const HELP: &str = "\
Commands:
  create <name>          host a new game
  join <code> <name>     join an existing game
  start                  start the game (host only)
  word <word>, w         add your word to the sentence
  guess <text>, g        guess the subject (guesser only)
  new                    leave the results screen
  leave                  leave the current game
  help                   show this list
  quit                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { player_name: String },
    Join { game_code: String, player_name: String },
    Start,
    /// Raw text; the input gate decides whether it is a word.
    Word(String),
    Guess(String),
    NewGame,
    Leave,
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}, type `help` for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(Usage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Create,
    Join,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Usage::Create => "create <name>",
            Usage::Join => "join <code> <name>",
        })
    }
}

impl Command {
    /// Parses one line. A blank line is `Ok(None)`.
    ///
    /// Names may contain spaces: everything after the command (or after the
    /// game code) is the name.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "create" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage(Usage::Create));
                }
                Command::Create { player_name: rest.to_string() }
            }
            "join" => {
                let Some((code, name)) = rest.split_once(char::is_whitespace) else {
                    return Err(CommandError::Usage(Usage::Join));
                };
                Command::Join { game_code: code.to_string(), player_name: name.trim().to_string() }
            }
            "start" => Command::Start,
            "word" | "w" => Command::Word(rest.to_string()),
            "guess" | "g" => Command::Guess(rest.to_string()),
            "new" => Command::NewGame,
            "leave" => Command::Leave,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(head.to_string())),
        };
        Ok(Some(command))
    }
}

/// Reads a yes/no answer. Anything but an explicit yes declines.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
