#![forbid(unsafe_code)]

//! Widget error boundaries with panic recovery.
//!
//! Wraps any widget in a safety boundary that catches panics during rendering
//! and displays a fallback view instead of crashing the application.
//!
//! A caught panic is handled in two steps, in order:
//!
//! 1. [`BoundaryState::capture`] commits the `Faulted` state from the fault
//!    alone.
//! 2. [`report_fault`] writes diagnostics, then the component stack recorded
//!    at panic time is attached to the caught error.
//!
//! The fallback is drawn in the same render pass, over a cleared area. It
//! carries a `Try Again` control; [`BoundaryState::reset`] returns to `Ok`
//! and the next pass renders the wrapped widget again. There is no retry
//! budget: a widget that keeps panicking shows the fallback again at once.

use std::any::Any;
use std::fmt;

use beau_core::geometry::Rect;
use beau_core::panic_capture::{self, PanicCapture, catch_contained, install_capture_hook};
use beau_render::cell::{Cell, PackedRgba};
use beau_render::frame::{Frame, HitId, HitRegion};
use beau_render::style::Style;
use beau_render::text::{truncate_with_ellipsis, wrap};

use crate::diagnostics::{DiagnosticSink, TracingSink, report_fault};
use crate::{StatefulWidget, Widget, draw_centered, draw_text_span, set_style_area};

/// Hit id registered for the fallback's reset control.
pub const RESET_CONTROL: HitId = HitId::new(0xB0A7);

/// Title shown at the top of the fallback view.
pub const FALLBACK_TITLE: &str = "🚨 Something went wrong";

/// Shown in place of an empty fault message.
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// Label of the reset control.
pub const RESET_LABEL: &str = "Try Again";

/// Maximum number of stack lines shown by the fallback.
pub const MAX_STACK_LINES: usize = 5;

/// A render fault: what a descendant panicked with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    /// Payload type: `&str`, `String`, `Fault`, or `unknown`.
    pub type_name: String,
    /// Panic message; empty when the payload carried none.
    pub message: String,
    /// Stack text; empty when unavailable.
    pub stack: String,
}

impl Fault {
    /// A structured fault with the given message and no stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            type_name: "Fault".to_string(),
            message: message.into(),
            stack: String::new(),
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }

    /// Panic with this fault as the payload.
    #[track_caller]
    pub fn raise(self) -> ! {
        std::panic::panic_any(self)
    }

    /// Recover a fault from a panic payload.
    ///
    /// String payloads keep their text. A payload of any other type yields
    /// an empty message.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<Fault>() {
            Ok(fault) => return *fault,
            Err(payload) => payload,
        };
        let (type_name, message) = if let Some(s) = payload.downcast_ref::<&'static str>() {
            ("&str", (*s).to_string())
        } else if let Some(s) = payload.downcast_ref::<String>() {
            ("String", s.clone())
        } else {
            ("unknown", String::new())
        };
        Self {
            type_name: type_name.to_string(),
            message,
            stack: String::new(),
        }
    }

    /// First lines of the stack text, as the fallback displays them.
    pub fn stack_preview(&self) -> impl Iterator<Item = &str> {
        self.stack.lines().take(MAX_STACK_LINES)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// The fault a boundary is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaughtError {
    pub fault: Fault,
    /// Components active when the fault was raised, innermost first.
    pub component_stack: Option<String>,
    reset_area: Option<Rect>,
}

impl CaughtError {
    /// Where the reset control was last drawn.
    pub fn reset_area(&self) -> Option<Rect> {
        self.reset_area
    }

    /// The message the fallback shows.
    pub fn display_message(&self) -> &str {
        if self.fault.message.is_empty() {
            GENERIC_MESSAGE
        } else {
            &self.fault.message
        }
    }
}

/// State for an error boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BoundaryState {
    /// The wrapped widget renders normally.
    #[default]
    Ok,
    /// The wrapped widget panicked; the fallback is shown.
    Faulted(CaughtError),
}

impl BoundaryState {
    /// Enter `Faulted` for `fault`. Depends on nothing but the fault.
    pub fn capture(&mut self, fault: Fault) {
        *self = Self::Faulted(CaughtError {
            fault,
            component_stack: None,
            reset_area: None,
        });
    }

    /// Attach the component stack to the caught error. No-op while `Ok`.
    pub fn attach_component_stack(&mut self, component_stack: impl Into<String>) {
        if let Self::Faulted(error) = self {
            error.component_stack = Some(component_stack.into());
        }
    }

    /// Return to `Ok` so the next render retries the wrapped widget.
    pub fn reset(&mut self) {
        if self.is_faulted() {
            tracing::debug!("error boundary reset");
        }
        *self = Self::Ok;
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }

    /// The caught error, if any.
    #[must_use = "use the returned error for diagnostics"]
    pub fn error(&self) -> Option<&CaughtError> {
        match self {
            Self::Ok => None,
            Self::Faulted(error) => Some(error),
        }
    }

    /// Whether (x, y) lands on the reset control of the current fallback.
    pub fn hits_reset(&self, x: u16, y: u16) -> bool {
        self.error()
            .and_then(CaughtError::reset_area)
            .is_some_and(|rect| rect.contains(x, y))
    }
}

/// A widget wrapper that catches panics from an inner widget.
///
/// Uses `StatefulWidget` so the error state persists across renders.
///
/// # Example
///
/// ```ignore
/// let boundary = ErrorBoundary::new(&chat_screen);
/// let mut state = BoundaryState::default();
/// boundary.render(area, &mut frame, &mut state);
/// ```
#[derive(Debug, Clone)]
pub struct ErrorBoundary<W, S = TracingSink> {
    inner: W,
    sink: S,
}

impl<W: Widget> ErrorBoundary<W> {
    /// Wrap `inner`, reporting faults through [`TracingSink`].
    pub fn new(inner: W) -> Self {
        install_capture_hook();
        Self {
            inner,
            sink: TracingSink,
        }
    }
}

impl<W: Widget, S: DiagnosticSink> ErrorBoundary<W, S> {
    /// Replace the diagnostic sink.
    #[must_use]
    pub fn sink<T: DiagnosticSink>(self, sink: T) -> ErrorBoundary<W, T> {
        ErrorBoundary {
            inner: self.inner,
            sink,
        }
    }

    fn handle_panic(
        &self,
        payload: Box<dyn Any + Send>,
        capture: Option<PanicCapture>,
        state: &mut BoundaryState,
    ) {
        let capture = capture.unwrap_or_else(|| PanicCapture {
            component_stack: panic_capture::component_stack(),
            ..PanicCapture::default()
        });

        let mut fault = Fault::from_panic(payload);
        if fault.stack.is_empty() {
            fault.stack = match &capture.location {
                Some(location) if capture.backtrace.is_empty() => format!("at {location}"),
                Some(location) => format!("at {location}\n{}", capture.backtrace),
                None => capture.backtrace.clone(),
            };
        }

        state.capture(fault.clone());
        report_fault(&self.sink, &fault, &capture.component_stack);
        state.attach_component_stack(capture.component_stack);
    }
}

impl<W: Widget, S: DiagnosticSink> StatefulWidget for ErrorBoundary<W, S> {
    type State = BoundaryState;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut BoundaryState) {
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "ErrorBoundary",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() {
            return;
        }
        let _scope = panic_capture::render_scope("ErrorBoundary");

        if let BoundaryState::Ok = state {
            match catch_contained(|| self.inner.render(area, frame)) {
                Ok(()) => return,
                Err((payload, capture)) => self.handle_panic(payload, capture, state),
            }
        }

        if let BoundaryState::Faulted(error) = state {
            render_fallback(frame, area, error);
        }
    }
}

/// Blank `area` and drop any hit regions or cursor placed inside it.
fn clear_area(frame: &mut Frame, area: Rect) {
    frame.buffer.fill(area, Cell::from_char(' '));
    if let Some(grid) = frame.hit_grid.as_mut() {
        grid.clear_rect(area);
    }
    if frame
        .cursor_position
        .is_some_and(|(x, y)| area.contains(x, y))
    {
        frame.cursor_position = None;
    }
}

const FALLBACK_BG: PackedRgba = PackedRgba::rgb(0xf8, 0xf9, 0xfa);
const TITLE_FG: PackedRgba = PackedRgba::rgb(0xdc, 0x35, 0x45);
const MUTED_FG: PackedRgba = PackedRgba::rgb(0x6c, 0x75, 0x7d);
const BUTTON_BG: PackedRgba = PackedRgba::rgb(0x00, 0x7b, 0xff);

enum Row {
    Centered(String, Style),
    Left(String, Style),
    Blank,
}

/// Draw the fallback view for `error` and record where its reset control
/// landed.
fn render_fallback(frame: &mut Frame, area: Rect, error: &mut CaughtError) {
    error.reset_area = None;
    clear_area(frame, area);
    set_style_area(frame, area, Style::new().fg(MUTED_FG).bg(FALLBACK_BG));

    let text_width = area.width.saturating_sub(4).max(1) as usize;
    let title = Style::new().fg(TITLE_FG).bg(FALLBACK_BG).bold();
    let muted = Style::new().fg(MUTED_FG).bg(FALLBACK_BG);

    let mut rows = vec![Row::Centered(FALLBACK_TITLE.to_string(), title), Row::Blank];
    rows.extend(
        wrap(error.display_message(), text_width)
            .into_iter()
            .map(|line| Row::Centered(line, muted)),
    );
    let stack: Vec<Row> = error
        .fault
        .stack_preview()
        .map(|line| Row::Left(truncate_with_ellipsis(line, text_width), muted.dim()))
        .collect();
    if !stack.is_empty() {
        rows.push(Row::Blank);
        rows.extend(stack);
    }
    rows.push(Row::Blank);

    // The reset control always gets the last row that fits.
    let available = area.height.saturating_sub(1) as usize;
    rows.truncate(available);
    let total = rows.len() as u16 + 1;
    let mut y = area.y + area.height.saturating_sub(total) / 2;
    let left = area.x + area.width.saturating_sub(text_width as u16) / 2;

    for row in &rows {
        match row {
            Row::Centered(text, style) => draw_centered(frame, area, y, text, *style),
            Row::Left(text, style) => {
                draw_text_span(frame, left, y, text, *style, area.right());
            }
            Row::Blank => {}
        }
        y += 1;
    }

    let label = format!("  {RESET_LABEL}  ");
    let label_width = beau_render::display_width(&label).min(area.width as usize) as u16;
    let button = Rect::new(
        area.x + (area.width - label_width) / 2,
        y,
        label_width,
        1,
    );
    let button_style = Style::new().fg(PackedRgba::WHITE).bg(BUTTON_BG).bold();
    frame.buffer.fill(
        button,
        Cell {
            bg: BUTTON_BG,
            ..Cell::from_char(' ')
        },
    );
    draw_centered(frame, button, y, RESET_LABEL, button_style);
    frame.register_hit(button, RESET_CONTROL, HitRegion::Button, 0);
    error.reset_area = Some(button);
}
