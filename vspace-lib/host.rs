//! Contract between the engine and the editor it runs in.
//!
//! The editor owns documents, selections, undo history and command
//! dispatch. The engine only observes them through [`Host`] and changes them
//! through native commands and edits. Editor notifications flow the other
//! way, into an [`EventSink`].

use std::{
  fmt,
  num::NonZeroUsize,
};

use async_trait::async_trait;
use serde::{
  Deserialize,
  Serialize,
};
use thiserror::Error;

use crate::{
  position::Position,
  selection::{
    Selection,
    Selections,
  },
};

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(NonZeroUsize);

impl DocumentId {
  pub const fn new(id: NonZeroUsize) -> Self {
    Self(id)
  }

  pub const fn get(self) -> NonZeroUsize {
    self.0
  }
}

impl From<NonZeroUsize> for DocumentId {
  fn from(value: NonZeroUsize) -> Self {
    Self::new(value)
  }
}

impl fmt::Display for DocumentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "doc#{}", self.0)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostError {
  #[error("no active editor")]
  NoActiveEditor,
  #[error("unknown document {0}")]
  UnknownDocument(DocumentId),
  #[error("line {line} is out of bounds (lines: {len})")]
  LineOutOfBounds { line: usize, len: usize },
  #[error("edit was rejected: {0}")]
  EditRejected(String),
  #[error("command `{command}` failed: {reason}")]
  Command {
    command: &'static str,
    reason:  String,
  },
}

/// Target of the generic `cursorMove` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMoveTo {
  WrappedLineStart,
  WrappedLineEnd,
}

impl CursorMoveTo {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::WrappedLineStart => "wrappedLineStart",
      Self::WrappedLineEnd => "wrappedLineEnd",
    }
  }
}

/// Native editor commands the engine delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
  CursorUp,
  CursorDown,
  CursorLeft,
  CursorRight,
  CursorEnd,
  Undo,
  Redo,
  CursorMove { to: CursorMoveTo },
}

impl HostCommand {
  /// Command id as registered by the editor.
  pub const fn id(self) -> &'static str {
    match self {
      Self::CursorUp => "cursorUp",
      Self::CursorDown => "cursorDown",
      Self::CursorLeft => "cursorLeft",
      Self::CursorRight => "cursorRight",
      Self::CursorEnd => "cursorEnd",
      Self::Undo => "undo",
      Self::Redo => "redo",
      Self::CursorMove { .. } => "cursorMove",
    }
  }
}

/// Whether an edit starts a new undo element or joins the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStop {
  Push,
  Merge,
}

/// Replaces `start..end` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
  pub start: Position,
  pub end:   Position,
  pub text:  String,
}

impl TextEdit {
  pub fn insert(at: Position, text: impl Into<String>) -> Self {
    Self::replace(at, at, text)
  }

  pub fn delete(start: Position, end: Position) -> Self {
    Self::replace(start, end, String::new())
  }

  pub fn replace(start: Position, end: Position, text: impl Into<String>) -> Self {
    Self {
      start,
      end,
      text: text.into(),
    }
  }
}

/// Per-document editor settings the geometry depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
  pub tab_size:        usize,
  pub word_wrap:       bool,
  /// Raw wrapping indent setting; see [`vspace_core::WrapIndent`].
  pub wrapping_indent: String,
}

impl Default for EditorOptions {
  fn default() -> Self {
    Self {
      tab_size:        4,
      word_wrap:       false,
      wrapping_indent: "same".into(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
  Info,
  Warning,
  Error,
}

/// What caused a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChangeKind {
  Keyboard,
  Mouse,
  Command,
  Unknown,
}

/// `removed` chars at `offset` were replaced by `text`.
///
/// Offsets count chars from the start of the document. Changes of one event
/// apply in order, each against the result of the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
  pub offset:  usize,
  pub removed: usize,
  pub text:    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
  SelectionChanged {
    doc:        DocumentId,
    selections: Selections,
    kind:       SelectionChangeKind,
  },
  ContentChanged {
    doc:     DocumentId,
    version: u64,
    changes: Vec<ContentChange>,
  },
  WillSave {
    doc: DocumentId,
  },
  Closed {
    doc: DocumentId,
  },
}

impl HostEvent {
  pub fn doc(&self) -> DocumentId {
    match self {
      Self::SelectionChanged { doc, .. }
      | Self::ContentChanged { doc, .. }
      | Self::WillSave { doc }
      | Self::Closed { doc } => *doc,
    }
  }
}

/// The editor as seen by the engine.
///
/// Queries are synchronous snapshots. Commands and edits are asynchronous and
/// only return once the editor state reflects them; a host may deliver
/// events to its [`EventSink`] before they return.
#[async_trait]
pub trait Host: Send + Sync + 'static {
  fn active_document(&self) -> Option<DocumentId>;

  fn selections(&self, doc: DocumentId) -> Result<Selections>;

  async fn set_selections(&self, doc: DocumentId, selections: &[Selection]) -> Result<()>;

  /// Text of `line` without its line ending.
  fn line_text(&self, doc: DocumentId, line: usize) -> Result<String>;

  fn text(&self, doc: DocumentId) -> Result<String>;

  /// Monotonic document version, bumped by every content change.
  fn version(&self, doc: DocumentId) -> Result<u64>;

  fn options(&self, doc: DocumentId) -> Result<EditorOptions>;

  /// Runs a native command on the active editor.
  async fn execute(&self, command: HostCommand) -> Result<()>;

  /// Applies `edits` in order. Returns `false` if the editor declined them.
  async fn apply_edits(&self, doc: DocumentId, edits: Vec<TextEdit>, undo: UndoStop)
  -> Result<bool>;

  fn notify(&self, level: MessageLevel, message: &str);
}

/// Receiver of editor notifications.
#[async_trait]
pub trait EventSink: Send + Sync {
  async fn handle_event(&self, event: HostEvent);
}
