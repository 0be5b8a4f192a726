//! Linear undo history of a [`crate::MemoryHost`] document.
//!
//! Each revision holds the changes of one undo element together with the
//! selections before and after it. Committing discards everything that was
//! undone; merging extends the revision below the current one.

use ropey::Rope;
use thiserror::Error;
use vspace_lib::{
  host::UndoStop,
  selection::Selections,
};

pub type Result<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
  #[error("revision index {index} is out of bounds (max: {max})")]
  RevisionOutOfBounds { index: usize, max: usize },
}

/// `removed` at `offset` was replaced by `inserted`. Offsets count chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
  pub offset:   usize,
  pub removed:  String,
  pub inserted: String,
}

impl Change {
  /// Replaces `len` chars of `text` at `offset`, capturing what was removed.
  pub fn apply_new(text: &mut Rope, offset: usize, len: usize, inserted: &str) -> Self {
    let removed = text.slice(offset..offset + len).to_string();
    text.remove(offset..offset + len);
    text.insert(offset, inserted);
    Self {
      offset,
      removed,
      inserted: inserted.to_string(),
    }
  }

  pub fn apply(&self, text: &mut Rope) {
    let end = self.offset + self.removed.chars().count();
    text.remove(self.offset..end);
    text.insert(self.offset, &self.inserted);
  }

  pub fn invert(&self) -> Self {
    Self {
      offset:   self.offset,
      removed:  self.inserted.clone(),
      inserted: self.removed.clone(),
    }
  }
}

#[derive(Debug, Clone)]
struct Revision {
  changes: Vec<Change>,
  before:  Selections,
  after:   Selections,
}

/// A pending move through the history. Apply `changes` in order, restore
/// `selections`, then hand the jump back to [`History::apply_jump`].
#[derive(Debug, Clone)]
pub struct HistoryJump {
  pub changes:    Vec<Change>,
  pub selections: Selections,
  pub target:     usize,
}

#[derive(Debug, Default)]
pub struct History {
  revisions: Vec<Revision>,
  /// Number of revisions currently applied.
  current:   usize,
}

impl History {
  pub fn commit(&mut self, changes: Vec<Change>, before: Selections, after: Selections, stop: UndoStop) {
    if changes.is_empty() {
      return;
    }
    self.revisions.truncate(self.current);

    match (stop, self.revisions.last_mut()) {
      (UndoStop::Merge, Some(revision)) => {
        revision.changes.extend(changes);
        revision.after = after;
      },
      _ => {
        self.revisions.push(Revision {
          changes,
          before,
          after,
        });
        self.current = self.revisions.len();
      },
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.revisions.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.revisions.is_empty()
  }

  #[inline]
  pub fn can_undo(&self) -> bool {
    self.current > 0
  }

  #[inline]
  pub fn can_redo(&self) -> bool {
    self.current < self.revisions.len()
  }

  pub fn undo(&self) -> Option<HistoryJump> {
    let revision = self.revisions[..self.current].last()?;
    Some(HistoryJump {
      changes:    revision.changes.iter().rev().map(Change::invert).collect(),
      selections: revision.before.clone(),
      target:     self.current - 1,
    })
  }

  pub fn redo(&self) -> Option<HistoryJump> {
    let revision = self.revisions.get(self.current)?;
    Some(HistoryJump {
      changes:    revision.changes.clone(),
      selections: revision.after.clone(),
      target:     self.current + 1,
    })
  }

  pub fn apply_jump(&mut self, jump: &HistoryJump) -> Result<()> {
    if jump.target > self.revisions.len() {
      return Err(HistoryError::RevisionOutOfBounds {
        index: jump.target,
        max:   self.revisions.len(),
      });
    }
    self.current = jump.target;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use smallvec::smallvec;
  use vspace_lib::{
    position::Position,
    selection::Selection,
  };

  use super::*;

  fn cursor(character: usize) -> Selections {
    smallvec![Selection::point(Position::new(0, character))]
  }

  fn edit(history: &mut History, text: &mut Rope, offset: usize, len: usize, insert: &str, stop: UndoStop) {
    let change = Change::apply_new(text, offset, len, insert);
    history.commit(vec![change], cursor(offset), cursor(offset + insert.len()), stop);
  }

  fn jump(text: &mut Rope, history: &mut History, redo: bool) -> Selections {
    let jump = if redo { history.redo() } else { history.undo() }.unwrap();
    for change in &jump.changes {
      change.apply(text);
    }
    history.apply_jump(&jump).unwrap();
    jump.selections
  }

  #[test]
  fn undo_and_redo() {
    let mut text = Rope::from("abc");
    let mut history = History::default();
    assert!(history.undo().is_none());

    edit(&mut history, &mut text, 3, 0, "def", UndoStop::Push);
    edit(&mut history, &mut text, 0, 1, "A", UndoStop::Push);
    assert_eq!(text, "Abcdef");

    let selections = jump(&mut text, &mut history, false);
    assert_eq!(text, "abcdef");
    assert_eq!(selections, cursor(0));

    jump(&mut text, &mut history, false);
    assert_eq!(text, "abc");
    assert!(!history.can_undo());

    let selections = jump(&mut text, &mut history, true);
    assert_eq!(text, "abcdef");
    assert_eq!(selections, cursor(6));
  }

  #[test]
  fn merged_edits_undo_together() {
    let mut text = Rope::from("begin(");
    let mut history = History::default();
    edit(&mut history, &mut text, 6, 0, " ", UndoStop::Push);
    edit(&mut history, &mut text, 7, 0, " ", UndoStop::Merge);
    edit(&mut history, &mut text, 7, 1, "", UndoStop::Merge);
    assert_eq!(text, "begin( ");
    assert_eq!(history.len(), 1);

    let selections = jump(&mut text, &mut history, false);
    assert_eq!(text, "begin(");
    assert_eq!(selections, cursor(6));
  }

  #[test]
  fn commit_discards_redo() {
    let mut text = Rope::from("");
    let mut history = History::default();
    edit(&mut history, &mut text, 0, 0, "a", UndoStop::Push);
    jump(&mut text, &mut history, false);
    assert!(history.can_redo());

    edit(&mut history, &mut text, 0, 0, "b", UndoStop::Merge);
    assert!(!history.can_redo());
    assert_eq!(history.len(), 1);
    assert_eq!(text, "b");
  }

  #[test]
  fn stale_jump_is_rejected() {
    let mut history = History::default();
    let jump = HistoryJump {
      changes:    Vec::new(),
      selections: Selections::new(),
      target:     1,
    };
    assert_eq!(
      history.apply_jump(&jump),
      Err(HistoryError::RevisionOutOfBounds { index: 1, max: 0 })
    );
  }
}
