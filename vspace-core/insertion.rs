//! Whitespace needed to fake a vertical move past the end of a line.
//!
//! After the editor moves the cursor up or down it clamps the cursor to the
//! end of a shorter target line. To keep the visual column the cursor had on
//! the source line, the target line gets padded with whitespace that mirrors
//! the tabs and spaces of the source line:
//!
//! ```text
//! tab size 8, "|" is the cursor
//!
//! before:  "\t[1|,2,3]"     after native move:  "|"
//! padding: "\t  "           after insertion:    "\t  |"
//! ```

use crate::width::{
  in_same_tab_slot,
  next_width,
};

struct Indent {
  text:     String,
  tab_size: usize,
}

impl Indent {
  /// Appends `ch` at column `width` and returns the column after it.
  ///
  /// A tab swallows trailing spaces that sit in the same tab slot, so the
  /// padding never ends up as spaces followed by a tab covering them.
  fn push(&mut self, mut width: usize, ch: char) -> usize {
    while ch == '\t'
      && self.text.ends_with(' ')
      && in_same_tab_slot(width, width - 1, self.tab_size)
    {
      self.text.pop();
      width -= 1;
    }
    self.text.push(ch);
    next_width(width, ch, self.tab_size)
  }
}

/// Computes the text to insert at the end of the target line of a vertical
/// move.
///
/// `character1`/`text1` describe the cursor and its line before the move,
/// `character2`/`text2` after the editor performed its own move. Returns
/// `None` when the editor landed inside the line or nothing is missing.
pub fn vertical_move_insertion(
  tab_size: usize,
  character1: usize,
  text1: &str,
  character2: usize,
  text2: &str,
) -> Option<String> {
  if character2 < text2.chars().count() {
    return None;
  }

  let mut indent = Indent {
    text: String::new(),
    tab_size,
  };
  let mut source = text1.chars();
  let mut target = text2.chars();
  let mut width1 = 0;
  let mut width2 = 0;

  for _ in 0..character1 {
    // past the end of the source line the cursor was in virtual space
    let ch1 = source.next().unwrap_or(' ');
    let prev_width1 = width1;
    width1 = next_width(width1, ch1, tab_size);

    while width2 < width1 {
      width2 = match target.next() {
        Some(ch2) => next_width(width2, ch2, tab_size),
        None if ch1 == '\t' && in_same_tab_slot(prev_width1, width2, tab_size) => {
          indent.push(width2, '\t')
        },
        None => indent.push(width2, ' '),
      };
    }
  }

  (!indent.text.is_empty()).then_some(indent.text)
}
