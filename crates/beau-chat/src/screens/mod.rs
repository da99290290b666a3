#![forbid(unsafe_code)]

//! Screens hosted by the app model.

pub mod chat;

use std::time::Duration;

use beau_core::event::Event;
use beau_core::geometry::Rect;
use beau_render::frame::Frame;
use beau_runtime::Cmd;

/// A full-window screen.
pub trait Screen {
    /// Message type for this screen (will be wrapped by the top-level message enum).
    type Message: Send + 'static;

    /// Handle a terminal event, returning a command.
    fn update(&mut self, event: &Event) -> Cmd<Self::Message>;

    /// Render the screen into the given area.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Advance animations by `dt`.
    fn tick(&mut self, _dt: Duration) {}

    /// Name used in logs and the component stack.
    fn title(&self) -> &'static str;
}
