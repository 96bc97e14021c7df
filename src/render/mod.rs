//! Output rendering (plain text)

pub mod text;

pub use text::{render_block, render_text, WordCache};
