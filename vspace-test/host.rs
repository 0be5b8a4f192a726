//! An editor that keeps its documents in memory.
//!
//! [`MemoryHost`] implements [`Host`] with the behavior the engine relies on
//! from a real editor: a native undo stack with merge support, cursor
//! commands that walk soft-wrapped segments, and change notifications that
//! arrive while the triggering call is still running.
//!
//! Besides the [`Host`] side it exposes the user's side (typing, clicking,
//! saving, closing) so tests can interleave outside activity with engine
//! commands.

use std::{
  num::NonZeroUsize,
  sync::{
    Arc,
    Weak,
  },
};

use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::Mutex;
use ropey::Rope;
use smallvec::smallvec;
use vspace_core::WrapIndent;
use vspace_lib::{
  host::{
    ContentChange,
    CursorMoveTo,
    DocumentId,
    EditorOptions,
    EventSink,
    Host,
    HostCommand,
    HostError,
    HostEvent,
    MessageLevel,
    Result,
    SelectionChangeKind,
    TextEdit,
    UndoStop,
  },
  position::{
    Position,
    char_idx_at_position,
    line_len,
    position_at_char_idx,
  },
  selection::{
    Selection,
    Selections,
    combine_coinciding_selections,
  },
};

use crate::{
  history::{
    Change,
    History,
  },
  layout::{
    LineLayout,
    Wrap,
  },
};

const DEFAULT_WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level:   MessageLevel,
  pub message: String,
}

struct Document {
  id:         DocumentId,
  text:       Rope,
  version:    u64,
  selections: Selections,
  history:    History,
  options:    EditorOptions,
  wrap_width: usize,
  read_only:  bool,
}

impl Document {
  fn new(id: DocumentId, text: &str, options: EditorOptions) -> Self {
    Self {
      id,
      text: Rope::from(text),
      version: 1,
      selections: smallvec![Selection::point(Position::zero())],
      history: History::default(),
      options,
      wrap_width: DEFAULT_WRAP_WIDTH,
      read_only: false,
    }
  }

  fn line_text(&self, line: usize) -> Result<String> {
    let len = self.text.len_lines();
    if line >= len {
      return Err(HostError::LineOutOfBounds { line, len });
    }
    let start = self.text.line_to_char(line);
    Ok(
      self
        .text
        .slice(start..start + line_len(&self.text, line))
        .to_string(),
    )
  }

  fn layout(&self, line: usize) -> Result<LineLayout> {
    let wrap = self.options.word_wrap.then(|| Wrap {
      width: self.wrap_width,
      mode:  self
        .options
        .wrapping_indent
        .parse()
        .unwrap_or(WrapIndent::None),
    });
    Ok(LineLayout::new(
      &self.line_text(line)?,
      self.options.tab_size,
      wrap,
    ))
  }

  fn clamp(&self, position: Position) -> Position {
    position_at_char_idx(&self.text, char_idx_at_position(&self.text, position))
  }

  fn selection_changed(&self, kind: SelectionChangeKind) -> HostEvent {
    HostEvent::SelectionChanged {
      doc: self.id,
      selections: self.selections.clone(),
      kind,
    }
  }

  fn set_selections(&mut self, selections: &[Selection], kind: SelectionChangeKind) -> Vec<HostEvent> {
    let clamped = selections
      .iter()
      .map(|selection| selection.map(|position| self.clamp(position)))
      .collect::<Vec<_>>();
    self.selections = if clamped.is_empty() {
      smallvec![Selection::point(Position::zero())]
    } else {
      combine_coinciding_selections(clamped)
    };
    vec![self.selection_changed(kind)]
  }

  fn content_changed(&self, changes: &[Change]) -> HostEvent {
    HostEvent::ContentChanged {
      doc:     self.id,
      version: self.version,
      changes: changes
        .iter()
        .map(|change| ContentChange {
          offset:  change.offset,
          removed: change.removed.chars().count(),
          text:    change.inserted.clone(),
        })
        .collect(),
    }
  }

  /// Applies `edits` in order as one step of `stop`.
  fn edit(&mut self, edits: &[TextEdit], stop: UndoStop, kind: SelectionChangeKind) -> Vec<HostEvent> {
    let before = self.selections.clone();
    let mut changes = Vec::with_capacity(edits.len());
    for edit in edits {
      let start = char_idx_at_position(&self.text, edit.start);
      let end = char_idx_at_position(&self.text, edit.end).max(start);
      let offsets = self.selection_offsets();
      let change = Change::apply_new(&mut self.text, start, end - start, &edit.text);
      self.selections = offsets
        .into_iter()
        .map(|(anchor, active)| {
          Selection::new(
            position_at_char_idx(&self.text, map_offset(anchor, &change)),
            position_at_char_idx(&self.text, map_offset(active, &change)),
          )
        })
        .collect();
      changes.push(change);
    }
    if changes.is_empty() {
      return Vec::new();
    }

    self.version += 1;
    let events = vec![self.content_changed(&changes), self.selection_changed(kind)];
    self
      .history
      .commit(changes, before, self.selections.clone(), stop);
    events
  }

  fn selection_offsets(&self) -> Vec<(usize, usize)> {
    self
      .selections
      .iter()
      .map(|selection| {
        (
          char_idx_at_position(&self.text, selection.anchor),
          char_idx_at_position(&self.text, selection.active),
        )
      })
      .collect()
  }

  fn undo_redo(&mut self, command: HostCommand) -> Result<Vec<HostEvent>> {
    let jump = match command {
      HostCommand::Redo => self.history.redo(),
      _ => self.history.undo(),
    };
    let Some(jump) = jump else {
      return Ok(Vec::new());
    };

    for change in &jump.changes {
      change.apply(&mut self.text);
    }
    self
      .history
      .apply_jump(&jump)
      .map_err(|err| HostError::Command {
        command: command.id(),
        reason:  err.to_string(),
      })?;
    self.version += 1;

    let mut events = vec![self.content_changed(&jump.changes)];
    events.extend(self.set_selections(&jump.selections, SelectionChangeKind::Unknown));
    Ok(events)
  }

  fn move_cursors(&mut self, command: HostCommand) -> Result<Vec<HostEvent>> {
    let moved = self
      .selections
      .iter()
      .map(|selection| self.moved(*selection, command).map(Selection::point))
      .collect::<Result<Vec<_>>>()?;
    Ok(self.set_selections(&moved, SelectionChangeKind::Keyboard))
  }

  fn moved(&self, selection: Selection, command: HostCommand) -> Result<Position> {
    let at = selection.active;
    let len = line_len(&self.text, at.line);
    Ok(match command {
      HostCommand::CursorLeft if !selection.is_empty() => selection.start(),
      HostCommand::CursorRight if !selection.is_empty() => selection.end(),
      HostCommand::CursorLeft => match at.character {
        0 if at.line > 0 => Position::new(at.line - 1, line_len(&self.text, at.line - 1)),
        0 => at,
        character => at.with_character(character - 1),
      },
      HostCommand::CursorRight if at.character < len => at.with_character(at.character + 1),
      HostCommand::CursorRight if at.line + 1 < self.text.len_lines() => Position::new(at.line + 1, 0),
      HostCommand::CursorRight => at,
      HostCommand::CursorEnd => at.with_character(len),
      HostCommand::CursorUp => self.moved_up(at)?,
      HostCommand::CursorDown => self.moved_down(at)?,
      HostCommand::CursorMove { to } => {
        let layout = self.layout(at.line)?;
        let segment = layout.segments()[layout.segment_of(at.character)];
        match to {
          CursorMoveTo::WrappedLineStart => at.with_character(segment.home),
          CursorMoveTo::WrappedLineEnd => at.with_character(segment.end),
        }
      },
      HostCommand::Undo | HostCommand::Redo => at,
    })
  }

  fn moved_up(&self, at: Position) -> Result<Position> {
    let layout = self.layout(at.line)?;
    let index = layout.segment_of(at.character);
    let column = layout.column(at.character);
    if index > 0 {
      return Ok(at.with_character(layout.character_at(index - 1, column)));
    }
    if at.line == 0 {
      return Ok(Position::zero());
    }
    let above = self.layout(at.line - 1)?;
    let last = above.segments().len() - 1;
    Ok(Position::new(at.line - 1, above.character_at(last, column)))
  }

  fn moved_down(&self, at: Position) -> Result<Position> {
    let layout = self.layout(at.line)?;
    let index = layout.segment_of(at.character);
    let column = layout.column(at.character);
    if index + 1 < layout.segments().len() {
      return Ok(at.with_character(layout.character_at(index + 1, column)));
    }
    if at.line + 1 >= self.text.len_lines() {
      return Ok(at.with_character(line_len(&self.text, at.line)));
    }
    let below = self.layout(at.line + 1)?;
    Ok(Position::new(at.line + 1, below.character_at(0, column)))
  }
}

fn map_offset(offset: usize, change: &Change) -> usize {
  let removed = change.removed.chars().count();
  if offset < change.offset {
    offset
  } else if offset < change.offset + removed {
    change.offset
  } else {
    offset - removed + change.inserted.chars().count()
  }
}

#[derive(Default)]
struct Inner {
  docs:          HashMap<DocumentId, Document>,
  active:        Option<DocumentId>,
  next_id:       usize,
  notifications: Vec<Notification>,
}

impl Inner {
  fn document(&self, doc: DocumentId) -> Result<&Document> {
    self.docs.get(&doc).ok_or(HostError::UnknownDocument(doc))
  }

  fn document_mut(&mut self, doc: DocumentId) -> Result<&mut Document> {
    self.docs.get_mut(&doc).ok_or(HostError::UnknownDocument(doc))
  }
}

#[derive(Default)]
pub struct MemoryHost {
  inner: Mutex<Inner>,
  sink:  Mutex<Option<Weak<dyn EventSink>>>,
}

impl MemoryHost {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Routes notifications to `sink` from now on.
  pub fn attach(&self, sink: Weak<dyn EventSink>) {
    *self.sink.lock() = Some(sink);
  }

  /// Stops routing notifications, returning the sink that received them.
  pub fn detach(&self) -> Option<Weak<dyn EventSink>> {
    self.sink.lock().take()
  }

  /// Opens `text` in a new editor, which becomes the active one.
  pub fn open(&self, text: &str, options: EditorOptions) -> DocumentId {
    let mut inner = self.inner.lock();
    inner.next_id += 1;
    let id = DocumentId::new(NonZeroUsize::MIN.saturating_add(inner.next_id - 1));
    inner.docs.insert(id, Document::new(id, text, options));
    inner.active = Some(id);
    tracing::trace!(%id, "opened document");
    id
  }

  pub fn set_active(&self, doc: Option<DocumentId>) {
    self.inner.lock().active = doc;
  }

  pub fn set_wrap_width(&self, doc: DocumentId, width: usize) -> Result<()> {
    self.inner.lock().document_mut(doc)?.wrap_width = width.max(1);
    Ok(())
  }

  pub fn set_options(&self, doc: DocumentId, options: EditorOptions) -> Result<()> {
    self.inner.lock().document_mut(doc)?.options = options;
    Ok(())
  }

  /// Makes the editor decline every edit of `doc`.
  pub fn set_read_only(&self, doc: DocumentId, read_only: bool) -> Result<()> {
    self.inner.lock().document_mut(doc)?.read_only = read_only;
    Ok(())
  }

  pub fn notifications(&self) -> Vec<Notification> {
    self.inner.lock().notifications.clone()
  }

  pub fn can_redo(&self, doc: DocumentId) -> Result<bool> {
    Ok(self.inner.lock().document(doc)?.history.can_redo())
  }

  /// The user types `text` over the primary selection.
  pub async fn type_text(&self, doc: DocumentId, text: &str) -> Result<()> {
    let events = {
      let mut inner = self.inner.lock();
      let document = inner.document_mut(doc)?;
      let selection = document.selections[0];
      let edit = TextEdit::replace(selection.start(), selection.end(), text);
      document.edit(&[edit], UndoStop::Push, SelectionChangeKind::Keyboard)
    };
    self.emit(events).await;
    Ok(())
  }

  /// The user places the cursor at `position` with the mouse.
  pub async fn click(&self, doc: DocumentId, position: Position) -> Result<()> {
    self
      .select(doc, &[Selection::point(position)], SelectionChangeKind::Mouse)
      .await
  }

  pub async fn select(&self, doc: DocumentId, selections: &[Selection], kind: SelectionChangeKind) -> Result<()> {
    let events = self
      .inner
      .lock()
      .document_mut(doc)?
      .set_selections(selections, kind);
    self.emit(events).await;
    Ok(())
  }

  pub async fn save(&self, doc: DocumentId) -> Result<()> {
    self.inner.lock().document(doc)?;
    self.emit(vec![HostEvent::WillSave { doc }]).await;
    Ok(())
  }

  pub async fn close(&self, doc: DocumentId) -> Result<()> {
    {
      let mut inner = self.inner.lock();
      inner
        .docs
        .remove(&doc)
        .ok_or(HostError::UnknownDocument(doc))?;
      if inner.active == Some(doc) {
        inner.active = None;
      }
    }
    self.emit(vec![HostEvent::Closed { doc }]).await;
    Ok(())
  }

  async fn emit(&self, events: Vec<HostEvent>) {
    let sink = self.sink.lock().as_ref().and_then(Weak::upgrade);
    let Some(sink) = sink else {
      return;
    };
    for event in events {
      sink.handle_event(event).await;
    }
  }
}

#[async_trait]
impl Host for MemoryHost {
  fn active_document(&self) -> Option<DocumentId> {
    self.inner.lock().active
  }

  fn selections(&self, doc: DocumentId) -> Result<Selections> {
    Ok(self.inner.lock().document(doc)?.selections.clone())
  }

  async fn set_selections(&self, doc: DocumentId, selections: &[Selection]) -> Result<()> {
    self
      .select(doc, selections, SelectionChangeKind::Command)
      .await
  }

  fn line_text(&self, doc: DocumentId, line: usize) -> Result<String> {
    self.inner.lock().document(doc)?.line_text(line)
  }

  fn text(&self, doc: DocumentId) -> Result<String> {
    Ok(self.inner.lock().document(doc)?.text.to_string())
  }

  fn version(&self, doc: DocumentId) -> Result<u64> {
    Ok(self.inner.lock().document(doc)?.version)
  }

  fn options(&self, doc: DocumentId) -> Result<EditorOptions> {
    Ok(self.inner.lock().document(doc)?.options.clone())
  }

  async fn execute(&self, command: HostCommand) -> Result<()> {
    let events = {
      let mut inner = self.inner.lock();
      let doc = inner.active.ok_or(HostError::NoActiveEditor)?;
      let document = inner.document_mut(doc)?;
      match command {
        HostCommand::Undo | HostCommand::Redo => document.undo_redo(command)?,
        _ => document.move_cursors(command)?,
      }
    };
    self.emit(events).await;
    Ok(())
  }

  async fn apply_edits(
    &self,
    doc: DocumentId,
    edits: Vec<TextEdit>,
    undo: UndoStop,
  ) -> Result<bool> {
    let events = {
      let mut inner = self.inner.lock();
      let document = inner.document_mut(doc)?;
      if document.read_only {
        return Ok(false);
      }
      document.edit(&edits, undo, SelectionChangeKind::Unknown)
    };
    self.emit(events).await;
    Ok(true)
  }

  fn notify(&self, level: MessageLevel, message: &str) {
    tracing::debug!(?level, "notification: {message}");
    self.inner.lock().notifications.push(Notification {
      level,
      message: message.to_string(),
    });
  }
}
