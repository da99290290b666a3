#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, frames, and terminal presentation.

pub mod buffer;
pub mod cell;
pub mod frame;
pub mod presenter;
pub mod style;
pub mod text;

pub use text::{display_width, grapheme_width};
