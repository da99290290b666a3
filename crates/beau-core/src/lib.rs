#![forbid(unsafe_code)]

//! Core: geometry, layout, input events, animation, panic capture and
//! terminal lifecycle.
//!
//! # Role in Beau Chat
//! `beau-core` is the input side of the stack. The runtime reads terminal
//! events through [`terminal_session::TerminalSession`], views lay
//! themselves out with [`layout::Flex`], and error boundaries rely on
//! [`panic_capture`] to recover diagnostic context from render panics.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod panic_capture;
pub mod terminal_session;
