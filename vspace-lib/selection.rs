//! Editor selections as reported by the host.
//!
//! A [`Selection`] has an `anchor` and an `active` end. The `active` end is
//! where the cursor is drawn; when both ends coincide the selection is a
//! plain cursor.

use hashbrown::HashSet;
use smallvec::SmallVec;

use crate::position::Position;

/// All selections of an editor, primary first.
pub type Selections = SmallVec<[Selection; 1]>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
  pub anchor: Position,
  pub active: Position,
}

impl Selection {
  pub const fn new(anchor: Position, active: Position) -> Self {
    Self { anchor, active }
  }

  pub const fn point(position: Position) -> Self {
    Self::new(position, position)
  }

  pub fn is_empty(&self) -> bool {
    self.anchor == self.active
  }

  pub fn start(&self) -> Position {
    self.anchor.min(self.active)
  }

  pub fn end(&self) -> Position {
    self.anchor.max(self.active)
  }

  /// Maps both ends with `f`.
  pub fn map(self, mut f: impl FnMut(Position) -> Position) -> Self {
    Self::new(f(self.anchor), f(self.active))
  }
}

/// Drops empty selections that sit on a position already taken by an
/// earlier empty selection. Non-empty selections and the order of the rest
/// are left alone.
///
/// Clamping cursors to a line end can make several of them coincide; the
/// host would otherwise keep drawing duplicate cursors.
pub fn combine_coinciding_selections(
  selections: impl IntoIterator<Item = Selection>,
) -> Selections {
  let mut seen = HashSet::new();
  selections
    .into_iter()
    .filter(|selection| !selection.is_empty() || seen.insert(selection.active))
    .collect()
}
