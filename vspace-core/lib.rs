//! Pure column arithmetic behind fake virtual space.
//!
//! Nothing in this crate touches a document or an editor. Every function
//! takes line text and character offsets (counted in `char`s, never bytes)
//! and returns visual columns, offsets or the whitespace that has to be
//! synthesized.

pub mod insertion;
pub mod width;
pub mod wrap;

pub use insertion::vertical_move_insertion;
pub use wrap::WrapIndent;
