#![forbid(unsafe_code)]

//! Widgets for Beau Chat: the error boundary, fault diagnostics, and the
//! chat surface pieces (header, message list, typing indicator, input,
//! background picker).

pub mod background_picker;
pub mod diagnostics;
pub mod error_boundary;
pub mod header;
pub mod input;
pub mod message_list;
pub mod typing_indicator;

pub use diagnostics::{
    DiagnosticLevel, DiagnosticLine, DiagnosticSink, MemorySink, Suggestion, TracingSink, classify,
    report_fault,
};
pub use error_boundary::{BoundaryState, CaughtError, ErrorBoundary, Fault};

use beau_core::geometry::Rect;
use beau_render::frame::Frame;
use beau_render::style::Style;

/// A `Widget` is a renderable component.
///
/// Widgets render themselves into a `Frame` within a given `Rect`.
pub trait Widget {
    /// Render the widget into the frame at the given area.
    fn render(&self, area: Rect, frame: &mut Frame);
}

/// A `StatefulWidget` is a widget that renders based on mutable state.
pub trait StatefulWidget {
    type State;

    /// Render the widget into the frame with mutable state.
    fn render(&self, area: Rect, frame: &mut Frame, state: &mut Self::State);
}

impl<W: Widget + ?Sized> Widget for &W {
    fn render(&self, area: Rect, frame: &mut Frame) {
        (**self).render(area, frame);
    }
}

/// Apply a style to all cells in a rectangular area, preserving content.
pub(crate) fn set_style_area(frame: &mut Frame, area: Rect, style: Style) {
    frame.buffer.set_style(area, style);
}

/// Draw a text span into the frame at the given position.
///
/// Returns the x position after the last drawn character.
/// Stops at `max_x` (exclusive).
pub(crate) fn draw_text_span(
    frame: &mut Frame,
    x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    frame.buffer.draw_text(x, y, content, style, max_x)
}

/// Draw `content` horizontally centered within `area` on row `y`.
pub(crate) fn draw_centered(frame: &mut Frame, area: Rect, y: u16, content: &str, style: Style) {
    let width = beau_render::display_width(content).min(area.width as usize) as u16;
    let x = area.x + (area.width - width) / 2;
    draw_text_span(frame, x, y, content, style, area.right());
}
