#![forbid(unsafe_code)]

//! Beau Chat
//!
//! A terminal chat screen with a scripted relationship coach. The screen is
//! rendered inside an error boundary: if it panics while rendering, the app
//! shows a fallback with the fault and a "Try Again" control instead of
//! tearing down the terminal.
//!
//! - [`app`] - top-level model: boundary state and input routing
//! - [`screens::chat`] - the chat screen
//! - [`cli`] - flags and `BEAU_*` environment overrides
//! - [`logging`] - `tracing` subscriber writing to a log file
//! - [`theme`] - background gradients and palette
//! - [`script`] - the persona's canned lines

pub mod app;
pub mod cli;
pub mod logging;
pub mod screens;
pub mod script;
pub mod theme;
