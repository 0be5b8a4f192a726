use std::{
  fmt,
  str::FromStr,
};

use thiserror::Error;

/// Prefix of the commands the engine registers with the editor.
pub const COMMAND_PREFIX: &str = "fakeVirtualSpace.";

/// User-facing commands that replace the editor's own bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
  CursorUp,
  CursorDown,
  CursorLeft,
  CursorRight,
  CursorEnd,
  Undo,
  Redo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command `{0}`")]
pub struct UnknownCommand(pub String);

impl Command {
  pub const ALL: [Command; 7] = [
    Command::CursorUp,
    Command::CursorDown,
    Command::CursorLeft,
    Command::CursorRight,
    Command::CursorEnd,
    Command::Undo,
    Command::Redo,
  ];

  const fn name(self) -> &'static str {
    match self {
      Self::CursorUp => "cursorUp",
      Self::CursorDown => "cursorDown",
      Self::CursorLeft => "cursorLeft",
      Self::CursorRight => "cursorRight",
      Self::CursorEnd => "cursorEnd",
      Self::Undo => "undo",
      Self::Redo => "redo",
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{COMMAND_PREFIX}{}", self.name())
  }
}

impl FromStr for Command {
  type Err = UnknownCommand;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.strip_prefix(COMMAND_PREFIX)
      .and_then(|name| Self::ALL.into_iter().find(|command| command.name() == name))
      .ok_or_else(|| UnknownCommand(s.to_string()))
  }
}
