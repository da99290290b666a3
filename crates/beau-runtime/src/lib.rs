#![forbid(unsafe_code)]

//! Beau runtime
//!
//! Ties the core and render crates into an application loop.
//!
//! - [`Model`] - application state and behavior
//! - [`Cmd`] - side effects requested by `init` and `update`
//! - [`Program`] - the terminal event loop
//! - [`ProgramSimulator`] - headless driver for tests
//!
//! The runtime consumes input events from `beau-core`, drives
//! `Model::update`, calls `Model::view` to fill a frame and hands the frame
//! to the presenter in `beau-render`.

pub mod program;
pub mod simulator;

pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::{CmdRecord, ProgramSimulator};
