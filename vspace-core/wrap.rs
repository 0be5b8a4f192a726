//! Columns inside soft-wrapped lines.
//!
//! With soft wrap enabled a logical line is drawn as several visual segments.
//! Continuation segments may be indented by the editor ([`WrapIndent`]), so
//! the column a cursor appears at is measured from the start of its segment
//! plus that synthetic indent.

use std::{
  fmt,
  str::FromStr,
};

use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::width::{
  char_is_indent,
  next_width,
};

/// How much indentation continuation segments of a wrapped line carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapIndent {
  /// Continuation segments start at column 0.
  None,
  /// Continuation segments keep the indentation of the logical line.
  Same,
  /// Like `Same`, plus one tab stop.
  Indent,
  /// Like `Same`, plus two tab stops.
  DeepIndent,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported wrapping indent `{0}`")]
pub struct ParseWrapIndentError(pub String);

impl FromStr for WrapIndent {
  type Err = ParseWrapIndentError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "none" => Ok(Self::None),
      "same" => Ok(Self::Same),
      "indent" => Ok(Self::Indent),
      "deepIndent" => Ok(Self::DeepIndent),
      other => Err(ParseWrapIndentError(other.to_string())),
    }
  }
}

impl fmt::Display for WrapIndent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::None => "none",
      Self::Same => "same",
      Self::Indent => "indent",
      Self::DeepIndent => "deepIndent",
    })
  }
}

/// Width of the indent drawn before the segment starting at `home`.
///
/// The first segment (`home == 0`) is never indented by the editor.
pub fn wrapped_line_indent(tab_size: usize, mode: WrapIndent, text: &str, home: usize) -> usize {
  if home == 0 || mode == WrapIndent::None {
    return 0;
  }

  let width = text
    .chars()
    .take(home)
    .take_while(|ch| char_is_indent(*ch))
    .fold(0, |width, ch| next_width(width, ch, tab_size));

  match mode {
    WrapIndent::None | WrapIndent::Same => width,
    WrapIndent::Indent => next_width(width, '\t', tab_size),
    WrapIndent::DeepIndent => next_width(next_width(width, '\t', tab_size), '\t', tab_size),
  }
}

/// Visual column of `cursor` within the segment that starts at `home`.
pub fn column_inside_wrapped_line(
  tab_size: usize,
  mode: WrapIndent,
  text: &str,
  home: usize,
  cursor: usize,
) -> usize {
  let indent = wrapped_line_indent(tab_size, mode, text, home);
  text
    .chars()
    .skip(home)
    .take(cursor.saturating_sub(home))
    .fold(indent, |width, ch| next_width(width, ch, tab_size))
}

/// Finds the first offset in `home..=end` whose column is at least `target`.
///
/// The flag tells whether the column was hit exactly. A tab stepping over
/// `target` yields `false` with the offset after the tab, and a segment that
/// is too short yields `(end, false)`.
pub fn character_inside_wrapped_line(
  tab_size: usize,
  mode: WrapIndent,
  text: &str,
  home: usize,
  end: usize,
  target: usize,
) -> (usize, bool) {
  let mut width = wrapped_line_indent(tab_size, mode, text, home);
  let mut chars = text.chars().skip(home);
  let mut character = home;

  loop {
    if width >= target {
      return (character, width == target);
    }
    if character >= end {
      return (end, false);
    }
    match chars.next() {
      Some(ch) => width = next_width(width, ch, tab_size),
      None => return (character, false),
    }
    character += 1;
  }
}
