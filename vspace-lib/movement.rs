use vspace_core::{
  WrapIndent,
  vertical_move_insertion,
  wrap::{
    character_inside_wrapped_line,
    column_inside_wrapped_line,
  },
};

use crate::{
  engine::{
    Engine,
    Result,
    Vertical,
  },
  host::{
    CursorMoveTo,
    DocumentId,
    Host,
    HostCommand,
    TextEdit,
    UndoStop,
  },
  position::Position,
  selection::Selection,
  state::DocState,
};

impl<H: Host> Engine<H> {
  async fn native(&self, command: HostCommand) -> Result<()> {
    tracing::trace!(command = command.id(), "delegating to the editor");
    Ok(self.host.execute(command).await?)
  }

  /// Moves right, padding the line when the cursor sits at its end.
  pub(crate) async fn cursor_right_in(&self, doc: DocumentId, state: &mut DocState) -> Result<()> {
    state.wrap_column = None;
    let (cursor, selections) = self.single_cursor(doc)?;
    let Some(cursor) = cursor else {
      self.revert_vspace(doc, state, Some(&selections)).await?;
      return self.native(HostCommand::CursorRight).await;
    };

    if cursor.character >= self.line_len(doc, cursor.line)? {
      if !state.vspace.covers(cursor) {
        self.revert_vspace(doc, state, Some(&selections)).await?;
      }
      let cursor = self.primary(doc)?.active;
      return self.insert_vspace(doc, state, cursor, " ").await;
    }

    if !state.vspace.covers(cursor) {
      self.revert_vspace(doc, state, Some(&selections)).await?;
    }
    self.native(HostCommand::CursorRight).await
  }

  /// Moves left, eating the padding from its end.
  pub(crate) async fn cursor_left_in(&self, doc: DocumentId, state: &mut DocState) -> Result<()> {
    state.wrap_column = None;
    let (cursor, selections) = self.single_cursor(doc)?;
    let Some(cursor) = cursor else {
      self.revert_vspace(doc, state, Some(&selections)).await?;
      return self.native(HostCommand::CursorLeft).await;
    };

    if let Some(anchor) = state.vspace.anchor()
      && state.vspace.covers(cursor)
      && cursor.character > anchor.character
    {
      if cursor.character < self.line_len(doc, cursor.line)? {
        return self.native(HostCommand::CursorLeft).await;
      }

      let target = cursor.with_character(cursor.character - 1);
      if target.character > anchor.character {
        let last = TextEdit::delete(target, cursor);
        self.edit(doc, state, vec![last], UndoStop::Merge).await?;
        self
          .host
          .set_selections(doc, &[Selection::point(target)])
          .await?;
      } else {
        self.revert_vspace(doc, state, None).await?;
        self
          .host
          .set_selections(doc, &[Selection::point(anchor)])
          .await?;
      }
      return Ok(());
    }

    self.revert_vspace(doc, state, Some(&selections)).await?;
    self.native(HostCommand::CursorLeft).await
  }

  pub(crate) async fn cursor_end_in(&self, doc: DocumentId, state: &mut DocState) -> Result<()> {
    state.wrap_column = None;
    let selections = self.host.selections(doc)?;
    self.revert_vspace(doc, state, Some(&selections)).await?;
    self.native(HostCommand::CursorEnd).await
  }

  /// Moves up or down, keeping the visual column with padding where the
  /// target line is too short.
  pub(crate) async fn cursor_vertical(
    &self,
    doc: DocumentId,
    state: &mut DocState,
    direction: Vertical,
  ) -> Result<()> {
    let command = match direction {
      Vertical::Up => HostCommand::CursorUp,
      Vertical::Down => HostCommand::CursorDown,
    };
    let (cursor, selections) = self.single_cursor(doc)?;
    let Some(before) = cursor else {
      state.wrap_column = None;
      self.revert_vspace(doc, state, Some(&selections)).await?;
      return self.native(command).await;
    };

    let options = self.host.options(doc)?;
    if options.word_wrap {
      match options.wrapping_indent.parse::<WrapIndent>() {
        Ok(mode) => {
          return self
            .cursor_vertical_wrapped(doc, state, command, before, options.tab_size, mode)
            .await;
        },
        Err(err) => {
          tracing::debug!(%doc, %err, "moving without virtual space");
          self.advise_unsupported_wrap(&options.wrapping_indent);
          state.wrap_column = None;
          self.revert_vspace(doc, state, Some(&selections)).await?;
          return self.native(command).await;
        },
      }
    }

    let text1 = self.host.line_text(doc, before.line)?;
    self.native(command).await?;
    let after = self.primary(doc)?.active;
    if after == before {
      return Ok(());
    }

    self
      .revert_vspace(doc, state, Some(&[Selection::point(after)]))
      .await?;
    let after = self.primary(doc)?.active;
    if after.line == before.line {
      return Ok(());
    }

    let text2 = self.host.line_text(doc, after.line)?;
    if let Some(padding) =
      vertical_move_insertion(options.tab_size, before.character, &text1, after.character, &text2)
    {
      self.insert_vspace(doc, state, after, &padding).await?;
    }
    Ok(())
  }

  async fn cursor_vertical_wrapped(
    &self,
    doc: DocumentId,
    state: &mut DocState,
    command: HostCommand,
    before: Position,
    tab_size: usize,
    mode: WrapIndent,
  ) -> Result<()> {
    let column = match state.wrap_column {
      Some(column) => column,
      None => {
        let text1 = self.host.line_text(doc, before.line)?;
        let home = self
          .wrapped_boundary(doc, before, CursorMoveTo::WrappedLineStart)
          .await?;
        column_inside_wrapped_line(tab_size, mode, &text1, home, before.character)
      },
    };

    self.native(command).await?;
    let landed = self.primary(doc)?.active;
    if landed == before {
      return Ok(());
    }
    self
      .revert_vspace(doc, state, Some(&[Selection::point(landed)]))
      .await?;
    let landed = self.primary(doc)?.active;
    state.wrap_column = Some(column);

    let text2 = self.host.line_text(doc, landed.line)?;
    let len = text2.chars().count();
    let home = self
      .wrapped_boundary(doc, landed, CursorMoveTo::WrappedLineStart)
      .await?;
    let end = self
      .wrapped_boundary(doc, landed, CursorMoveTo::WrappedLineEnd)
      .await?;
    let (character, reached) =
      character_inside_wrapped_line(tab_size, mode, &text2, home, end, column);
    let target = landed.with_character(character);

    // only the last segment of a line can take padding
    if !reached && end >= len && character == len {
      let missing = column.saturating_sub(column_inside_wrapped_line(
        tab_size, mode, &text2, home, len,
      ));
      if missing > 0 {
        return self
          .insert_vspace(doc, state, target, &" ".repeat(missing))
          .await;
      }
    }

    // the editor lands from the current column, which indents and tabs may
    // have shifted away from the remembered one
    if reached && target != landed {
      self
        .host
        .set_selections(doc, &[Selection::point(target)])
        .await?;
    }
    Ok(())
  }

  /// Character offset of the start or end of the visual segment holding
  /// `at`. The cursor is put back on `at` afterwards.
  async fn wrapped_boundary(&self, doc: DocumentId, at: Position, to: CursorMoveTo) -> Result<usize> {
    self.native(HostCommand::CursorMove { to }).await?;
    let boundary = self.primary(doc)?.active;
    self
      .host
      .set_selections(doc, &[Selection::point(at)])
      .await?;
    Ok(if boundary.line == at.line {
      boundary.character
    } else {
      at.character
    })
  }
}
