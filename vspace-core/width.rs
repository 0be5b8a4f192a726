//! Visual width of line prefixes under a tab size.

#[inline]
fn tab_size(tab_size: usize) -> usize {
  tab_size.max(1)
}

/// Number of columns a tab occupies when it starts at `width`.
#[inline]
pub fn tab_width_at(width: usize, tab_size: usize) -> usize {
  let tab_size = self::tab_size(tab_size);
  tab_size - (width % tab_size)
}

/// Visual column reached after drawing `ch` at column `width`.
///
/// A tab advances to the next tab stop, anything else takes one column.
#[inline]
pub fn next_width(width: usize, ch: char, tab_size: usize) -> usize {
  if ch == '\t' {
    width + tab_width_at(width, tab_size)
  } else {
    width + 1
  }
}

/// Whether both columns fall into the same tab slot.
#[inline]
pub fn in_same_tab_slot(width1: usize, width2: usize, tab_size: usize) -> bool {
  let tab_size = self::tab_size(tab_size);
  width1 / tab_size == width2 / tab_size
}

#[inline]
pub fn char_is_indent(ch: char) -> bool {
  ch == ' ' || ch == '\t'
}

/// Visual column after the first `character` chars of `text`.
///
/// Offsets past the end of the line stop at the line end.
pub fn width_at(text: &str, character: usize, tab_size: usize) -> usize {
  text
    .chars()
    .take(character)
    .fold(0, |width, ch| next_width(width, ch, tab_size))
}

pub fn str_width(text: &str, tab_size: usize) -> usize {
  text
    .chars()
    .fold(0, |width, ch| next_width(width, ch, tab_size))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_tab_width_at() {
    assert_eq!(tab_width_at(0, 4), 4);
    assert_eq!(tab_width_at(1, 4), 3);
    assert_eq!(tab_width_at(3, 4), 1);
    assert_eq!(tab_width_at(4, 4), 4);
    assert_eq!(tab_width_at(5, 8), 3);
  }

  #[test]
  fn tab_rounds_up_to_next_stop() {
    assert_eq!(next_width(0, '\t', 8), 8);
    assert_eq!(next_width(7, '\t', 8), 8);
    assert_eq!(next_width(8, '\t', 8), 16);
    assert_eq!(next_width(3, '\t', 4), 4);
    assert_eq!(next_width(3, 'x', 4), 4);
    assert_eq!(next_width(0, ' ', 4), 1);
  }

  #[test]
  fn zero_tab_size_behaves_like_one() {
    assert_eq!(next_width(3, '\t', 0), 4);
    assert!(!in_same_tab_slot(1, 2, 0));
  }

  #[test]
  fn tab_slots() {
    assert!(in_same_tab_slot(0, 7, 8));
    assert!(!in_same_tab_slot(7, 8, 8));
    assert!(in_same_tab_slot(5, 4, 4));
    assert!(!in_same_tab_slot(4, 3, 4));
  }

  #[test]
  fn prefix_widths() {
    assert_eq!(width_at("\tab", 0, 4), 0);
    assert_eq!(width_at("\tab", 1, 4), 4);
    assert_eq!(width_at("\tab", 3, 4), 6);
    assert_eq!(width_at("\tab", 10, 4), 6);
    assert_eq!(width_at("ab\tc", 3, 8), 8);
    assert_eq!(str_width("[helll\tlo\tw]o\trld", 8), 27);
    assert_eq!(str_width("", 8), 0);
  }

  quickcheck::quickcheck! {
      fn width_is_monotonic(text: String, tab: u8) -> bool {
          let tab = usize::from(tab % 16) + 1;
          let mut width = 0;
          text.chars().all(|ch| {
              let next = next_width(width, ch, tab);
              let ok = next > width && next - width <= tab;
              width = next;
              ok
          })
      }
  }
}
