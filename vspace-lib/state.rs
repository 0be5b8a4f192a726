//! Per-document virtual space state.

use hashbrown::HashMap;

use crate::{
  host::DocumentId,
  ledger::RedoLedger,
  position::Position,
};

/// Whether a document currently carries synthesized whitespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VirtualSpace {
  #[default]
  Clean,
  /// Padding runs from `anchor` to the end of `anchor.line`.
  Active { anchor: Position },
}

impl VirtualSpace {
  pub fn anchor(&self) -> Option<Position> {
    match self {
      Self::Clean => None,
      Self::Active { anchor } => Some(*anchor),
    }
  }

  pub fn is_active(&self) -> bool {
    matches!(self, Self::Active { .. })
  }

  /// Whether `position` lies on the padding, anchor included.
  pub fn covers(&self, position: Position) -> bool {
    self
      .anchor()
      .is_some_and(|anchor| anchor.line == position.line && position.character >= anchor.character)
  }
}

#[derive(Debug, Clone, Default)]
pub struct DocState {
  /// Document version after the engine last looked at or edited it.
  pub version:     u64,
  pub vspace:      VirtualSpace,
  pub ledger:      RedoLedger,
  /// Visual column inside the wrapped segment kept across vertical moves.
  pub wrap_column: Option<usize>,
}

impl DocState {
  pub fn new(version: u64) -> Self {
    Self {
      version,
      ..Self::default()
    }
  }

  /// Drops assumptions about content that changed behind the engine's back.
  /// Recorded redos hold offsets into the old text, so they go too.
  pub fn invalidate(&mut self, version: u64) {
    self.version = version;
    self.vspace = VirtualSpace::Clean;
    self.wrap_column = None;
    self.ledger.clear();
  }
}

/// Owns the state of every document the engine has seen.
#[derive(Debug, Default)]
pub struct Registry {
  docs: HashMap<DocumentId, DocState>,
}

impl Registry {
  /// State of `doc`, created on first use and revalidated against the
  /// version the host currently reports.
  pub fn entry(&mut self, doc: DocumentId, version: u64) -> &mut DocState {
    let state = self
      .docs
      .entry(doc)
      .or_insert_with(|| DocState::new(version));
    if state.version != version {
      tracing::debug!(
        %doc,
        cached = state.version,
        current = version,
        "document changed outside the engine, dropping virtual space"
      );
      state.invalidate(version);
    }
    state
  }

  pub fn get(&self, doc: DocumentId) -> Option<&DocState> {
    self.docs.get(&doc)
  }

  pub fn get_mut(&mut self, doc: DocumentId) -> Option<&mut DocState> {
    self.docs.get_mut(&doc)
  }

  pub fn remove(&mut self, doc: DocumentId) -> Option<DocState> {
    self.docs.remove(&doc)
  }

  pub fn len(&self) -> usize {
    self.docs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.docs.is_empty()
  }
}
