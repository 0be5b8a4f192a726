//! The virtual space session.
//!
//! # Serialization
//!
//! Every command and every editor event runs while holding the registry
//! lock. The lock is fair, so commands are processed strictly in the order
//! they arrive. An event that finds the lock taken was caused by the engine
//! itself (editors report selection and content changes for the engine's
//! own edits while the edit is still being awaited) and is dropped.
//!
//! The only exception is the redo recorder: content changes are fed to an
//! active [`Recording`] before the lock is even looked at, since the undo
//! they belong to is in flight and holds the registry lock.
//!
//! # Padding and undo
//!
//! The first edit of a padding run opens its own undo element and every
//! further edit of the run merges into it, so a single native undo removes
//! the whole run. Padding is only ever reverted that way while the document
//! version still matches the one recorded after the engine's last edit;
//! anything else means the padding was built upon and is real content now.
//!
//! Synthetic edits therefore do not merge into the user's previous undo
//! stop. A native undo issued outside the engine shows the padding as a step
//! of its own; [`Command::Undo`] and [`Command::Redo`] step over it.

use std::sync::{
  Arc,
  atomic::{
    AtomicBool,
    Ordering,
  },
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{
  Mutex,
  MutexGuard,
};

use crate::{
  command::Command,
  config::Config,
  host::{
    DocumentId,
    EventSink,
    Host,
    HostCommand,
    HostError,
    HostEvent,
    MessageLevel,
    SelectionChangeKind,
    TextEdit,
    UndoStop,
  },
  ledger::Recording,
  position::Position,
  selection::{
    Selection,
    Selections,
    combine_coinciding_selections,
  },
  state::{
    DocState,
    Registry,
    VirtualSpace,
  },
};

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error(transparent)]
  Host(#[from] HostError),
  #[error("the editor declined an edit of {0}")]
  EditDeclined(DocumentId),
}

pub struct Engine<H> {
  pub(crate) host:      Arc<H>,
  pub(crate) config:    Config,
  registry:             Mutex<Registry>,
  pub(crate) recording: parking_lot::Mutex<Option<Recording>>,
  closed:               parking_lot::Mutex<Vec<DocumentId>>,
  advised_wrap:         AtomicBool,
}

impl<H: Host> Engine<H> {
  pub fn new(host: Arc<H>, config: Config) -> Self {
    Self {
      host,
      config,
      registry: Mutex::new(Registry::default()),
      recording: parking_lot::Mutex::new(None),
      closed: parking_lot::Mutex::new(Vec::new()),
      advised_wrap: AtomicBool::new(false),
    }
  }

  pub fn host(&self) -> &Arc<H> {
    &self.host
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Anchor of the padding in `doc`, if any.
  pub async fn virtual_space(&self, doc: DocumentId) -> VirtualSpace {
    self
      .lock()
      .await
      .get(doc)
      .map(|state| state.vspace)
      .unwrap_or_default()
  }

  /// Number of replayable redos recorded for `doc`.
  pub async fn redo_depth(&self, doc: DocumentId) -> usize {
    self
      .lock()
      .await
      .get(doc)
      .map_or(0, |state| state.ledger.len())
  }

  pub async fn cursor_up(&self) {
    self.execute(Command::CursorUp).await
  }

  pub async fn cursor_down(&self) {
    self.execute(Command::CursorDown).await
  }

  pub async fn cursor_left(&self) {
    self.execute(Command::CursorLeft).await
  }

  pub async fn cursor_right(&self) {
    self.execute(Command::CursorRight).await
  }

  pub async fn cursor_end(&self) {
    self.execute(Command::CursorEnd).await
  }

  pub async fn undo(&self) {
    self.execute(Command::Undo).await
  }

  pub async fn redo(&self) {
    self.execute(Command::Redo).await
  }

  /// Runs `command` on the active editor.
  ///
  /// Failures end the command and are reported to the user; they never
  /// propagate to the caller.
  pub async fn execute(&self, command: Command) {
    let mut registry = self.lock().await;
    let result = self.run(&mut registry, command).await;
    drop(registry);

    match result {
      Ok(()) => {},
      Err(EngineError::Host(HostError::NoActiveEditor)) => {
        tracing::debug!(%command, "no active editor");
      },
      Err(err) => {
        tracing::warn!(%command, %err, "virtual space command failed");
        self
          .host
          .notify(MessageLevel::Error, &format!("{command} failed: {err}"));
      },
    }
  }

  async fn run(&self, registry: &mut Registry, command: Command) -> Result<()> {
    let doc = self
      .host
      .active_document()
      .ok_or(HostError::NoActiveEditor)?;
    let version = self.host.version(doc)?;
    let state = registry.entry(doc, version);

    tracing::trace!(%command, %doc, vspace = ?state.vspace, "running command");
    match command {
      Command::CursorUp => self.cursor_vertical(doc, state, Vertical::Up).await,
      Command::CursorDown => self.cursor_vertical(doc, state, Vertical::Down).await,
      Command::CursorLeft => self.cursor_left_in(doc, state).await,
      Command::CursorRight => self.cursor_right_in(doc, state).await,
      Command::CursorEnd => self.cursor_end_in(doc, state).await,
      Command::Undo => self.undo_in(doc, state).await,
      Command::Redo => self.redo_in(doc, state).await,
    }
  }

  async fn lock(&self) -> MutexGuard<'_, Registry> {
    let mut registry = self.registry.lock().await;
    self.forget_closed(&mut registry);
    registry
  }

  fn forget_closed(&self, registry: &mut Registry) {
    let closed = std::mem::take(&mut *self.closed.lock());
    for doc in closed {
      registry.remove(doc);
    }
  }

  /// Entry point for editor notifications.
  pub async fn handle_event(&self, event: HostEvent) {
    if let HostEvent::ContentChanged { doc, changes, .. } = &event {
      if let Some(recording) = self.recording.lock().as_mut() {
        if recording.doc() == *doc {
          changes.iter().for_each(|change| recording.record(change));
        }
      }
    }

    let Ok(mut registry) = self.registry.try_lock() else {
      if let HostEvent::Closed { doc } = event {
        self.closed.lock().push(doc);
      } else {
        tracing::trace!(doc = %event.doc(), "ignoring event raised by own edit");
      }
      return;
    };
    self.forget_closed(&mut registry);

    let doc = event.doc();
    if let Err(err) = self.dispatch_event(&mut registry, event).await {
      tracing::warn!(%doc, %err, "failed to handle editor event");
    }
  }

  async fn dispatch_event(&self, registry: &mut Registry, event: HostEvent) -> Result<()> {
    match event {
      HostEvent::SelectionChanged {
        doc,
        selections,
        kind,
      } => {
        let version = self.host.version(doc)?;
        let state = registry.entry(doc, version);
        self.selection_changed(doc, state, &selections, kind).await
      },
      HostEvent::ContentChanged { doc, version, .. } => {
        if let Some(state) = registry.get_mut(doc) {
          if state.vspace.is_active() {
            tracing::debug!(%doc, "padding became part of an edit");
          }
          state.invalidate(version);
        }
        Ok(())
      },
      HostEvent::WillSave { doc } => {
        let padded = registry.get(doc).is_some_and(|state| state.vspace.is_active());
        if padded && self.config.notify_on_save {
          self.host.notify(
            MessageLevel::Info,
            "Saving with virtual space: the padding after the cursor is saved as whitespace",
          );
        }
        Ok(())
      },
      HostEvent::Closed { doc } => {
        registry.remove(doc);
        Ok(())
      },
    }
  }

  /// Selection moved by something other than the engine.
  async fn selection_changed(
    &self,
    doc: DocumentId,
    state: &mut DocState,
    selections: &[Selection],
    kind: SelectionChangeKind,
  ) -> Result<()> {
    state.wrap_column = None;
    let Some(anchor) = state.vspace.anchor() else {
      return Ok(());
    };

    let interactive = matches!(
      kind,
      SelectionChangeKind::Keyboard | SelectionChangeKind::Mouse
    );
    match selections {
      [selection] if interactive && selection.is_empty() && selection.active.line == anchor.line => {
        let position = selection.active;
        if position.character <= anchor.character {
          return Ok(());
        }
        let end = self.line_len(doc, anchor.line)?;
        if position.character < end {
          tracing::trace!(%doc, ?position, "shrinking padding to the cursor");
          let trailing = TextEdit::delete(position, position.with_character(end));
          self.edit(doc, state, vec![trailing], UndoStop::Merge).await?;
          self
            .host
            .set_selections(doc, &[Selection::point(position)])
            .await?;
        }
        Ok(())
      },
      _ => self.revert_vspace(doc, state, Some(selections)).await,
    }
  }

  pub(crate) fn line_len(&self, doc: DocumentId, line: usize) -> Result<usize> {
    Ok(self.host.line_text(doc, line)?.chars().count())
  }

  pub(crate) fn primary(&self, doc: DocumentId) -> Result<Selection> {
    let selections = self.host.selections(doc)?;
    Ok(selections.first().copied().unwrap_or_default())
  }

  /// The single plain cursor, or `None` with several or non-empty selections.
  pub(crate) fn single_cursor(&self, doc: DocumentId) -> Result<(Option<Position>, Selections)> {
    let selections = self.host.selections(doc)?;
    let cursor = match selections.as_slice() {
      [selection] if selection.is_empty() => Some(selection.active),
      _ => None,
    };
    Ok((cursor, selections))
  }

  /// Applies edits that belong to the padding run.
  pub(crate) async fn edit(
    &self,
    doc: DocumentId,
    state: &mut DocState,
    edits: Vec<TextEdit>,
    undo: UndoStop,
  ) -> Result<()> {
    if !self.host.apply_edits(doc, edits, undo).await? {
      return Err(EngineError::EditDeclined(doc));
    }
    state.ledger.mark_perturbed();
    state.version = self.host.version(doc)?;
    Ok(())
  }

  /// Starts or extends the padding run at `at` and puts the cursor after it.
  pub(crate) async fn insert_vspace(
    &self,
    doc: DocumentId,
    state: &mut DocState,
    at: Position,
    padding: &str,
  ) -> Result<()> {
    let undo = if state.vspace.covers(at) {
      UndoStop::Merge
    } else {
      self.revert_vspace(doc, state, None).await?;
      UndoStop::Push
    };

    tracing::trace!(%doc, ?at, ?padding, ?undo, "inserting padding");
    self
      .edit(doc, state, vec![TextEdit::insert(at, padding)], undo)
      .await?;
    if undo == UndoStop::Push {
      state.vspace = VirtualSpace::Active { anchor: at };
    }
    self
      .host
      .set_selections(doc, &[Selection::point(at.traverse(padding))])
      .await?;
    Ok(())
  }

  /// Removes the padding run with one native undo.
  ///
  /// `keep` are the selections to restore afterwards; positions inside the
  /// removed padding end up on its anchor. Without `keep` the cursor is
  /// left where the editor's undo put it.
  pub(crate) async fn revert_vspace(
    &self,
    doc: DocumentId,
    state: &mut DocState,
    keep: Option<&[Selection]>,
  ) -> Result<()> {
    let Some(anchor) = state.vspace.anchor() else {
      return Ok(());
    };
    state.vspace = VirtualSpace::Clean;

    let version = self.host.version(doc)?;
    if version != state.version {
      tracing::debug!(%doc, "padding was edited, keeping it as content");
      state.version = version;
      return Ok(());
    }

    tracing::trace!(%doc, ?anchor, "reverting padding");
    self.host.execute(HostCommand::Undo).await?;
    state.ledger.mark_perturbed();
    state.version = self.host.version(doc)?;

    if let Some(keep) = keep {
      let clamp = |position: Position| {
        if position.line == anchor.line && position.character > anchor.character {
          anchor
        } else {
          position
        }
      };
      let restored =
        combine_coinciding_selections(keep.iter().map(|selection| selection.map(clamp)));
      self.host.set_selections(doc, &restored).await?;
    }
    Ok(())
  }

  /// Tells the user once that a wrapping indent mode is not emulated.
  pub(crate) fn advise_unsupported_wrap(&self, mode: &str) {
    if !self.config.advise_unsupported_wrap || self.advised_wrap.swap(true, Ordering::Relaxed) {
      return;
    }
    self.host.notify(
      MessageLevel::Warning,
      &format!("Virtual space is not available with wrapping indent `{mode}`"),
    );
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vertical {
  Up,
  Down,
}

#[async_trait]
impl<H: Host> EventSink for Engine<H> {
  async fn handle_event(&self, event: HostEvent) {
    Engine::handle_event(self, event).await
  }
}
