//! Redo bookkeeping for intercepted undos.
//!
//! Reverting padding is itself a native undo, and inserting padding is a
//! native edit. Either one leaves the editor's redo stack holding padding
//! instead of the user's changes. To keep redo working, every intercepted
//! undo records the exact inverse of what it changed, so the change can be
//! replayed as a plain edit later.

use ropey::Rope;

use crate::{
  host::{
    ContentChange,
    DocumentId,
    TextEdit,
  },
  position::position_at_char_idx,
};

/// Replace `len` chars at `offset` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverseOp {
  pub offset: usize,
  pub len:    usize,
  pub text:   String,
}

impl InverseOp {
  fn apply(&self, text: &mut Rope) {
    let start = self.offset.min(text.len_chars());
    let end = (start + self.len).min(text.len_chars());
    text.remove(start..end);
    text.insert(start, &self.text);
  }
}

/// Everything one intercepted undo changed, in the order it was changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedoEntry {
  ops: Vec<InverseOp>,
}

impl RedoEntry {
  pub fn ops(&self) -> &[InverseOp] {
    &self.ops
  }

  /// Edits that redo this entry on `text`, in application order.
  pub fn edits(&self, text: &Rope) -> Vec<TextEdit> {
    let mut text = text.clone();
    self
      .ops
      .iter()
      .rev()
      .map(|op| {
        let start = position_at_char_idx(&text, op.offset);
        let end = position_at_char_idx(&text, op.offset + op.len);
        op.apply(&mut text);
        TextEdit::replace(start, end, op.text.clone())
      })
      .collect()
  }
}

/// Captures the changes of one undo while it is in flight.
#[derive(Debug)]
pub struct Recording {
  doc:    DocumentId,
  shadow: Rope,
  ops:    Vec<InverseOp>,
}

impl Recording {
  /// Starts recording `doc`, whose content before the undo is `text`.
  pub fn new(doc: DocumentId, text: &str) -> Self {
    Self {
      doc,
      shadow: Rope::from(text),
      ops: Vec::new(),
    }
  }

  pub fn doc(&self) -> DocumentId {
    self.doc
  }

  pub fn record(&mut self, change: &ContentChange) {
    let len_chars = self.shadow.len_chars();
    let start = change.offset.min(len_chars);
    let end = (start + change.removed).min(len_chars);
    let removed = self.shadow.slice(start..end).to_string();

    self.shadow.remove(start..end);
    self.shadow.insert(start, &change.text);
    self.ops.push(InverseOp {
      offset: start,
      len:    change.text.chars().count(),
      text:   removed,
    });
  }

  pub fn finish(self) -> Option<RedoEntry> {
    (!self.ops.is_empty()).then_some(RedoEntry { ops: self.ops })
  }
}

/// Replayable redos of one document, most recent last.
#[derive(Debug, Clone, Default)]
pub struct RedoLedger {
  entries:   Vec<RedoEntry>,
  /// The editor's own redo stack no longer matches `entries`.
  perturbed: bool,
}

impl RedoLedger {
  pub fn push(&mut self, entry: RedoEntry) {
    self.entries.push(entry);
  }

  pub fn pop(&mut self) -> Option<RedoEntry> {
    self.entries.pop()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn is_perturbed(&self) -> bool {
    self.perturbed
  }

  pub fn mark_perturbed(&mut self) {
    self.perturbed = true;
  }

  /// Forgets everything; the editor's redo stack is trustworthy again.
  pub fn clear(&mut self) {
    self.entries.clear();
    self.perturbed = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::position::Position;

  fn doc() -> DocumentId {
    DocumentId::new(std::num::NonZeroUsize::new(1).unwrap())
  }

  fn apply(text: &mut Rope, edits: &[TextEdit]) {
    for edit in edits {
      let start = crate::position::char_idx_at_position(text, edit.start);
      let end = crate::position::char_idx_at_position(text, edit.end);
      text.remove(start..end);
      text.insert(start, &edit.text);
    }
  }

  #[test]
  fn records_removed_text_from_shadow() {
    let mut recording = Recording::new(doc(), "abcdef\n");
    recording.record(&ContentChange {
      offset:  3,
      removed: 3,
      text:    String::new(),
    });
    let entry = recording.finish().unwrap();
    assert_eq!(entry.ops(), &[InverseOp {
      offset: 3,
      len:    0,
      text:   "def".into(),
    }]);

    let edits = entry.edits(&Rope::from("abc\n"));
    assert_eq!(edits, vec![TextEdit::insert(Position::new(0, 3), "def")]);
  }

  #[test]
  fn replays_sequential_changes_in_reverse() {
    let before = "one\ntwo\nthree";
    let mut recording = Recording::new(doc(), before);
    let changes = [
      ContentChange {
        offset:  4,
        removed: 3,
        text:    "2".into(),
      },
      ContentChange {
        offset:  0,
        removed: 0,
        text:    "zero\n".into(),
      },
      ContentChange {
        offset:  11,
        removed: 5,
        text:    "3!".into(),
      },
    ];
    let mut after = Rope::from(before);
    for change in &changes {
      recording.record(change);
      after.remove(change.offset..change.offset + change.removed);
      after.insert(change.offset, &change.text);
    }
    assert_eq!(after, "zero\none\n2\n3!");

    let entry = recording.finish().unwrap();
    let mut text = after.clone();
    apply(&mut text, &entry.edits(&after));
    assert_eq!(text, before);
  }

  #[test]
  fn empty_recording_has_no_entry() {
    assert_eq!(Recording::new(doc(), "abc").finish(), None);
  }

  fn sanitize(text: String) -> String {
    text
      .chars()
      .map(|ch| {
        if ch.is_alphanumeric() || ch == '\n' || ch == ' ' {
          ch
        } else {
          'x'
        }
      })
      .collect()
  }

  quickcheck::quickcheck! {
    fn replay_restores_text(before: String, changes: Vec<(usize, usize, String)>) -> bool {
      let before = sanitize(before);
      let mut recording = Recording::new(doc(), &before);
      let mut after = Rope::from(before.as_str());
      for (offset, removed, text) in changes {
        let len = after.len_chars();
        let offset = offset % (len + 1);
        let removed = removed % (len - offset + 1);
        let change = ContentChange {
          offset,
          removed,
          text: sanitize(text),
        };
        recording.record(&change);
        after.remove(offset..offset + removed);
        after.insert(offset, &change.text);
      }

      let Some(entry) = recording.finish() else {
        return true;
      };
      let mut text = after.clone();
      apply(&mut text, &entry.edits(&after));
      text == before.as_str()
    }
  }

  #[test]
  fn ledger_perturbation() {
    let mut ledger = RedoLedger::default();
    assert!(!ledger.is_perturbed());
    ledger.push(RedoEntry::default());
    ledger.mark_perturbed();
    assert_eq!(ledger.len(), 1);
    assert!(ledger.is_perturbed());
    ledger.clear();
    assert!(ledger.is_empty());
    assert!(!ledger.is_perturbed());
  }
}
