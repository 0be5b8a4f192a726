//! Soft wrap of a single line into visual segments.
//!
//! Lines break at the column limit regardless of word boundaries. The
//! continuation indent follows [`WrapIndent`], and every segment holds at
//! least one char.

use vspace_core::{
  WrapIndent,
  width::next_width,
  wrap::{
    character_inside_wrapped_line,
    column_inside_wrapped_line,
    wrapped_line_indent,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrap {
  pub width: usize,
  pub mode:  WrapIndent,
}

/// `home..end` are the char offsets a cursor can take inside a segment. Only
/// the last segment of a line reaches the line end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
  pub home: usize,
  pub end:  usize,
}

#[derive(Debug, Clone)]
pub struct LineLayout {
  text:     String,
  tab_size: usize,
  mode:     WrapIndent,
  segments: Vec<Segment>,
}

impl LineLayout {
  pub fn new(text: &str, tab_size: usize, wrap: Option<Wrap>) -> Self {
    let len = text.chars().count();
    let mut homes = vec![0];
    if let Some(wrap) = wrap {
      let mut home = 0;
      let mut width = 0;
      for (character, ch) in text.chars().enumerate() {
        let next = next_width(width, ch, tab_size);
        if next > wrap.width && character > home {
          home = character;
          homes.push(home);
          width = next_width(wrapped_line_indent(tab_size, wrap.mode, text, home), ch, tab_size);
        } else {
          width = next;
        }
      }
    }

    let segments = homes
      .iter()
      .enumerate()
      .map(|(i, &home)| Segment {
        home,
        end: homes.get(i + 1).map_or(len, |next| next - 1),
      })
      .collect();
    Self {
      text: text.to_string(),
      tab_size,
      mode: wrap.map_or(WrapIndent::None, |wrap| wrap.mode),
      segments,
    }
  }

  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  /// Index of the segment `character` is drawn in.
  pub fn segment_of(&self, character: usize) -> usize {
    self
      .segments
      .iter()
      .rposition(|segment| segment.home <= character)
      .unwrap_or(0)
  }

  pub fn column(&self, character: usize) -> usize {
    let segment = self.segments[self.segment_of(character)];
    column_inside_wrapped_line(self.tab_size, self.mode, &self.text, segment.home, character)
  }

  /// Offset inside segment `index` drawn closest to `column`.
  pub fn character_at(&self, index: usize, column: usize) -> usize {
    let segment = self.segments[index];
    let (character, _) = character_inside_wrapped_line(
      self.tab_size,
      self.mode,
      &self.text,
      segment.home,
      segment.end,
      column,
    );
    if character > segment.home {
      let after = self.column(character);
      let before = self.column(character - 1);
      if after > column && column - before < after - column {
        return character - 1;
      }
    }
    character
  }
}

#[cfg(test)]
mod tests {
  use quickcheck::quickcheck;

  use super::*;

  fn wrap(width: usize, mode: WrapIndent) -> Option<Wrap> {
    Some(Wrap { width, mode })
  }

  #[test]
  fn unwrapped_line_has_one_segment() {
    let layout = LineLayout::new("hello world", 4, None);
    assert_eq!(layout.segments(), &[Segment { home: 0, end: 11 }]);
    assert_eq!(layout.column(5), 5);
  }

  #[test]
  fn breaks_at_width() {
    let layout = LineLayout::new("123456789 123456789 123456789", 4, wrap(20, WrapIndent::None));
    assert_eq!(layout.segments(), &[
      Segment { home: 0, end: 19 },
      Segment { home: 20, end: 29 },
    ]);
    assert_eq!(layout.segment_of(19), 0);
    assert_eq!(layout.segment_of(20), 1);
    assert_eq!(layout.column(25), 5);
  }

  #[test]
  fn continuation_keeps_indent() {
    let layout = LineLayout::new("   456789 123456789 123456789", 4, wrap(20, WrapIndent::Same));
    assert_eq!(layout.segments()[1].home, 20);
    assert_eq!(layout.column(20), 3);
    assert_eq!(layout.character_at(1, 3), 20);
  }

  #[test]
  fn rounds_to_nearest_column_across_tabs() {
    let layout = LineLayout::new("\tx", 4, None);
    assert_eq!(layout.character_at(0, 1), 0);
    assert_eq!(layout.character_at(0, 3), 1);
    assert_eq!(layout.character_at(0, 9), 2);
  }

  quickcheck! {
    fn segments_cover_line(text: String, width: u8) -> bool {
      let text: String = text.chars().filter(|ch| *ch != '\n' && *ch != '\r').collect();
      let len = text.chars().count();
      let layout = LineLayout::new(&text, 4, wrap(usize::from(width % 40) + 1, WrapIndent::Same));
      let segments = layout.segments();
      segments.first().map(|segment| segment.home) == Some(0)
        && segments.last().map(|segment| segment.end) == Some(len)
        && segments.windows(2).all(|pair| pair[0].end + 1 == pair[1].home && pair[0].home < pair[1].home)
    }
  }
}
