use std::sync::{
  Arc,
  Weak,
};

use vspace_lib::{
  command::Command,
  config::Config,
  engine::Engine,
  host::{
    DocumentId,
    EditorOptions,
    Host,
    HostCommand,
    SelectionChangeKind,
  },
  position::Position,
  selection::Selection,
  state::VirtualSpace,
};

use crate::MemoryHost;

/// An engine wired to a [`MemoryHost`] with one open document.
pub struct Session {
  pub host:   Arc<MemoryHost>,
  pub engine: Arc<Engine<MemoryHost>>,
  pub doc:    DocumentId,
}

impl Session {
  pub fn new(text: &str) -> Self {
    Self::with_options(text, EditorOptions::default(), Config::default())
  }

  pub fn with_options(text: &str, options: EditorOptions, config: Config) -> Self {
    let host = MemoryHost::new();
    let engine = Arc::new(Engine::new(host.clone(), config));
    let sink: Weak<Engine<MemoryHost>> = Arc::downgrade(&engine);
    host.attach(sink);
    let doc = host.open(text, options);
    Self { host, engine, doc }
  }

  /// Soft wraps the document at `width` columns.
  pub fn wrapped(text: &str, width: usize, wrapping_indent: &str) -> Self {
    Self::wrapped_with_tab_size(text, width, wrapping_indent, EditorOptions::default().tab_size)
  }

  pub fn wrapped_with_tab_size(text: &str, width: usize, wrapping_indent: &str, tab_size: usize) -> Self {
    let options = EditorOptions {
      word_wrap: true,
      wrapping_indent: wrapping_indent.into(),
      tab_size,
      ..EditorOptions::default()
    };
    let session = Self::with_options(text, options, Config::default());
    session
      .host
      .set_wrap_width(session.doc, width)
      .expect("document is open");
    session
  }

  pub fn text(&self) -> String {
    self.host.text(self.doc).expect("document is open")
  }

  pub fn cursor(&self) -> Position {
    self.host.selections(self.doc).expect("document is open")[0].active
  }

  pub async fn vspace(&self) -> VirtualSpace {
    self.engine.virtual_space(self.doc).await
  }

  pub async fn run(&self, command: Command) {
    self.engine.execute(command).await
  }

  /// Runs a native editor command behind the engine's back.
  pub async fn native(&self, command: HostCommand) {
    self.host.execute(command).await.expect("native command");
  }

  pub async fn place(&self, line: usize, character: usize) {
    self
      .host
      .select(
        self.doc,
        &[Selection::point(Position::new(line, character))],
        SelectionChangeKind::Command,
      )
      .await
      .expect("document is open");
  }
}
