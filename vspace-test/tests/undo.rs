use vspace_lib::{
  command::Command,
  host::{
    Host,
    HostCommand,
    TextEdit,
    UndoStop,
  },
  position::Position,
  state::VirtualSpace,
};
use vspace_test::Session;

#[tokio::test]
async fn undo_skips_over_padding() {
  let session = Session::new("abc\n");
  session.native(HostCommand::CursorEnd).await;
  session.host.type_text(session.doc, "def").await.unwrap();
  assert_eq!(session.text(), "abcdef\n");

  session.run(Command::CursorRight).await;
  assert_eq!(session.text(), "abcdef \n");

  session.run(Command::Undo).await;
  assert_eq!(session.text(), "abc\n");
  assert_eq!(session.cursor(), Position::new(0, 3));
  assert_eq!(session.vspace().await, VirtualSpace::Clean);
}

#[tokio::test]
async fn redo_survives_padding_inserted_after_undo() {
  let session = Session::new("abc\n");
  session.native(HostCommand::CursorEnd).await;
  session.host.type_text(session.doc, "def").await.unwrap();
  assert_eq!(session.text(), "abcdef\n");

  session.run(Command::Undo).await;
  assert_eq!(session.text(), "abc\n");
  assert_eq!(session.engine.redo_depth(session.doc).await, 1);

  session.run(Command::CursorDown).await;
  assert_eq!(session.text(), "abc\n   ");
  // the padding edit wiped the editor's own redo stack
  assert!(!session.host.can_redo(session.doc).unwrap());

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "abcdef\n");
  assert_eq!(session.cursor(), Position::new(0, 6));
  assert_eq!(session.engine.redo_depth(session.doc).await, 0);
}

#[tokio::test]
async fn redo_is_native_while_history_is_intact() {
  let session = Session::new("");
  session.host.type_text(session.doc, "a").await.unwrap();
  session.host.type_text(session.doc, "b").await.unwrap();

  session.run(Command::Undo).await;
  session.run(Command::Undo).await;
  assert_eq!(session.text(), "");
  assert_eq!(session.engine.redo_depth(session.doc).await, 2);

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "a");
  assert_eq!(session.engine.redo_depth(session.doc).await, 1);
  assert!(session.host.can_redo(session.doc).unwrap());

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "ab");
  assert_eq!(session.engine.redo_depth(session.doc).await, 0);
}

#[tokio::test]
async fn replayed_redos_apply_in_order() {
  let session = Session::new("");
  session.host.type_text(session.doc, "a").await.unwrap();
  session.host.type_text(session.doc, "b").await.unwrap();
  session.run(Command::Undo).await;
  session.run(Command::Undo).await;
  assert_eq!(session.text(), "");

  session.run(Command::CursorRight).await;
  assert_eq!(session.text(), " ");

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "a");
  session.run(Command::Redo).await;
  assert_eq!(session.text(), "ab");

  // exhausted
  session.run(Command::Redo).await;
  assert_eq!(session.text(), "ab");
}

#[tokio::test]
async fn redo_does_not_resurrect_padding() {
  let session = Session::new("ab");
  session.native(HostCommand::CursorEnd).await;
  session.run(Command::CursorRight).await;
  assert_eq!(session.text(), "ab ");

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "ab");
  session.run(Command::Redo).await;
  assert_eq!(session.text(), "ab");
  assert!(session.host.notifications().is_empty());
}

#[tokio::test]
async fn undo_of_multi_line_change_is_replayed_exactly() {
  let session = Session::new("one\nthree");
  session.native(HostCommand::CursorEnd).await;
  session.host.type_text(session.doc, "\ntwo").await.unwrap();
  assert_eq!(session.text(), "one\ntwo\nthree");

  session.run(Command::Undo).await;
  assert_eq!(session.text(), "one\nthree");
  session.run(Command::CursorDown).await;
  session.run(Command::CursorEnd).await;
  session.run(Command::CursorRight).await;
  assert_eq!(session.text(), "one\nthree ");

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "one\ntwo\nthree");
  assert_eq!(session.cursor(), Position::new(1, 3));
}

#[tokio::test]
async fn outside_edit_forgets_recorded_redos() {
  let session = Session::new("");
  session.host.type_text(session.doc, "a").await.unwrap();
  session.run(Command::Undo).await;
  assert_eq!(session.engine.redo_depth(session.doc).await, 1);

  session.host.type_text(session.doc, "z").await.unwrap();
  assert_eq!(session.engine.redo_depth(session.doc).await, 0);

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "z");
}

#[tokio::test]
async fn unseen_outside_edit_forgets_recorded_redos() {
  let session = Session::new("hello");
  session
    .host
    .click(session.doc, Position::new(0, 2))
    .await
    .unwrap();
  session.host.type_text(session.doc, "X").await.unwrap();
  session.run(Command::Undo).await;
  assert_eq!(session.text(), "hello");

  session.run(Command::CursorEnd).await;
  session.run(Command::CursorRight).await;
  session.run(Command::CursorLeft).await;
  assert_eq!(session.text(), "hello");
  assert_eq!(session.engine.redo_depth(session.doc).await, 1);

  // the engine never hears about this edit
  let sink = session.host.detach().unwrap();
  let edit = TextEdit::insert(Position::zero(), "123");
  assert!(
    session
      .host
      .apply_edits(session.doc, vec![edit], UndoStop::Push)
      .await
      .unwrap()
  );
  session.host.attach(sink);

  session.run(Command::Redo).await;
  assert_eq!(session.text(), "123hello");
  assert_eq!(session.engine.redo_depth(session.doc).await, 0);
}
