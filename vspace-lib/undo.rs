use ropey::Rope;

use crate::{
  engine::{
    Engine,
    EngineError,
    Result,
  },
  host::{
    DocumentId,
    Host,
    HostCommand,
    UndoStop,
  },
  ledger::Recording,
  selection::Selection,
  state::DocState,
};

impl<H: Host> Engine<H> {
  /// Drops the padding, then undoes one real step while recording what it
  /// changed so the step can be redone by hand.
  pub(crate) async fn undo_in(&self, doc: DocumentId, state: &mut DocState) -> Result<()> {
    state.wrap_column = None;
    self.revert_vspace(doc, state, None).await?;

    let text = self.host.text(doc)?;
    *self.recording.lock() = Some(Recording::new(doc, &text));
    let undone = self.host.execute(HostCommand::Undo).await;
    let recording = self.recording.lock().take();
    undone?;

    if let Some(entry) = recording.and_then(Recording::finish) {
      tracing::trace!(%doc, ops = entry.ops().len(), "recorded redo");
      state.ledger.push(entry);
    }
    state.version = self.host.version(doc)?;
    Ok(())
  }

  /// Redoes natively while the editor's redo stack is intact, and replays
  /// recorded undos once padding edits have cleared it.
  pub(crate) async fn redo_in(&self, doc: DocumentId, state: &mut DocState) -> Result<()> {
    state.wrap_column = None;
    self.revert_vspace(doc, state, None).await?;

    if !state.ledger.is_perturbed() {
      self.host.execute(HostCommand::Redo).await?;
      state.ledger.pop();
      state.version = self.host.version(doc)?;
      return Ok(());
    }

    let Some(entry) = state.ledger.pop() else {
      tracing::debug!(%doc, "nothing to redo");
      return Ok(());
    };
    let edits = entry.edits(&Rope::from(self.host.text(doc)?));
    let cursor = edits.last().map(|edit| edit.start.traverse(&edit.text));
    if !self.host.apply_edits(doc, edits, UndoStop::Push).await? {
      return Err(EngineError::EditDeclined(doc));
    }
    state.version = self.host.version(doc)?;

    if let Some(cursor) = cursor {
      self
        .host
        .set_selections(doc, &[Selection::point(cursor)])
        .await?;
    }
    Ok(())
  }
}
