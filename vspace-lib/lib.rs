//! Fake virtual space for editors that have none.
//!
//! The [`engine::Engine`] sits between an editor ([`host::Host`]) and the
//! user's cursor commands. When the cursor moves past the end of a line it
//! pads the line with whitespace, and it retracts that padding as soon as
//! the cursor leaves it again. Undo and redo are intercepted so the padding
//! never shows up as a step of its own.

pub mod command;
pub mod config;
pub mod engine;
pub mod host;
pub mod ledger;
mod movement;
pub mod position;
pub mod selection;
pub mod state;
mod undo;

pub use vspace_core;
