//! In-memory editor for driving the virtual space engine in tests.

pub mod history;
mod host;
pub mod layout;
mod session;

pub use host::{
  MemoryHost,
  Notification,
};
pub use session::Session;
