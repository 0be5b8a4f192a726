use std::cmp::Ordering;

use ropey::Rope;

/// A single point in a document: a line and a `char` offset within it.
/// 0-indexed as all things should be.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
  pub line:      usize,
  pub character: usize,
}

impl PartialOrd for Position {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Position {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .line
      .cmp(&other.line)
      .then(self.character.cmp(&other.character))
  }
}

impl Position {
  pub const fn new(line: usize, character: usize) -> Self {
    Self { line, character }
  }

  pub const fn zero() -> Self {
    Self {
      line:      0,
      character: 0,
    }
  }

  pub const fn with_character(self, character: usize) -> Self {
    Self {
      line: self.line,
      character,
    }
  }

  /// Position after `text` has been inserted at `self`.
  pub fn traverse(self, text: impl AsRef<str>) -> Self {
    let Self {
      mut line,
      mut character,
    } = self;
    let mut chars = text.as_ref().chars().peekable();

    while let Some(ch) = chars.next() {
      if ch == '\n' || (ch == '\r' && chars.peek() != Some(&'\n')) {
        line += 1;
        character = 0;
      } else if ch != '\r' {
        character += 1;
      }
    }

    Self { line, character }
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}

/// Number of chars on `line`, line ending excluded.
pub fn line_len(text: &Rope, line: usize) -> usize {
  if line >= text.len_lines() {
    return 0;
  }
  let slice = text.line(line);
  let mut len = slice.len_chars();
  if len > 0 && slice.char(len - 1) == '\n' {
    len -= 1;
  }
  if len > 0 && slice.char(len - 1) == '\r' {
    len -= 1;
  }
  len
}

/// Converts a char index into a [`Position`].
pub fn position_at_char_idx(text: &Rope, idx: usize) -> Position {
  let idx = idx.min(text.len_chars());
  let line = text.char_to_line(idx);
  Position::new(line, idx - text.line_to_char(line))
}

/// Converts a [`Position`] into a char index.
///
/// If `line` exceeds the number of lines, the end of the text is used.
/// If `character` exceeds the line, the line end is used.
pub fn char_idx_at_position(text: &Rope, position: Position) -> usize {
  if position.line >= text.len_lines() {
    return text.len_chars();
  }
  text.line_to_char(position.line) + position.character.min(line_len(text, position.line))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ordering_is_line_major() {
    assert!(Position::new(0, 9) < Position::new(1, 0));
    assert!(Position::new(2, 3) < Position::new(2, 4));
    assert_eq!(Position::new(1, 1).max(Position::new(1, 0)), Position::new(1, 1));
  }

  #[test]
  fn traverse_text() {
    assert_eq!(Position::new(0, 3).traverse("   "), Position::new(0, 6));
    assert_eq!(Position::new(1, 3).traverse("a\nbc"), Position::new(2, 2));
    assert_eq!(Position::new(0, 1).traverse("\r\n"), Position::new(1, 0));
    assert_eq!(Position::new(0, 1).traverse(""), Position::new(0, 1));
  }

  #[test]
  fn char_idx_round_trip() {
    let text = Rope::from("abc\n\n\tx\r\nend");
    assert_eq!(line_len(&text, 0), 3);
    assert_eq!(line_len(&text, 1), 0);
    assert_eq!(line_len(&text, 2), 2);
    assert_eq!(line_len(&text, 3), 3);
    assert_eq!(line_len(&text, 7), 0);

    for idx in [0, 3, 4, 5, 7, 9, 12] {
      let position = position_at_char_idx(&text, idx);
      assert_eq!(char_idx_at_position(&text, position), idx);
    }
    assert_eq!(position_at_char_idx(&text, 6), Position::new(2, 1));
  }

  #[test]
  fn char_idx_clamps() {
    let text = Rope::from("abc\nde");
    assert_eq!(char_idx_at_position(&text, Position::new(0, 10)), 3);
    assert_eq!(char_idx_at_position(&text, Position::new(5, 0)), 6);
    assert_eq!(position_at_char_idx(&text, 100), Position::new(1, 2));
  }
}
