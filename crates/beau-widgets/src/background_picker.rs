#![forbid(unsafe_code)]

//! Background picker overlay.
//!
//! A centered panel listing the available chat backgrounds, each with a
//! gradient swatch. Selection moves with Up/Down; Enter chooses, Esc
//! dismisses. The state remembers where the rows were drawn so a click
//! chooses directly; rows also register [`HitRegion::ListItem`] hits carrying
//! the option index.

use beau_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use beau_core::geometry::Rect;
use beau_render::cell::{Cell, PackedRgba};
use beau_render::display_width;
use beau_render::frame::{Frame, HitId, HitRegion};
use beau_render::style::Style;

use crate::{StatefulWidget, draw_centered, draw_text_span};

/// Hit id for picker rows.
pub const PICKER_ROWS: HitId = HitId::new(0xB6_01);

const TITLE: &str = "Choose Background";
const HINT: &str = "↑↓ move  Enter select  Esc close";
const SWATCH_COLUMNS: u16 = 4;
const MIN_WIDTH: u16 = 36;

const PANEL_BG: PackedRgba = PackedRgba::WHITE;
const TITLE_FG: PackedRgba = PackedRgba::rgb(0x1f, 0x29, 0x37);
const ITEM_FG: PackedRgba = PackedRgba::rgb(0x37, 0x41, 0x51);
const HINT_FG: PackedRgba = PackedRgba::rgb(0x9c, 0xa3, 0xaf);
const HIGHLIGHT_BG: PackedRgba = PackedRgba::rgb(0xe0, 0xe7, 0xff);

/// A selectable chat background: a two-stop vertical gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundOption {
    pub id: &'static str,
    pub name: &'static str,
    pub gradient: [PackedRgba; 2],
}

impl BackgroundOption {
    /// Gradient color at row `y` of a surface `height` rows tall.
    pub fn color_at(&self, y: u16, height: u16) -> PackedRgba {
        let [top, bottom] = self.gradient;
        if height <= 1 {
            return top;
        }
        top.lerp(bottom, f32::from(y) / f32::from(height - 1))
    }
}

/// What a picker input resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    /// Input not handled.
    Ignored,
    /// Highlight moved.
    Moved,
    /// Option at this index was chosen; the picker should close.
    Chosen(usize),
    /// Closed without choosing.
    Dismissed,
}

/// Highlighted row of the picker, plus where its rows were last drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PickerState {
    pub highlighted: usize,
    rows: Option<Rect>,
}

impl PickerState {
    pub fn new(highlighted: usize) -> Self {
        Self {
            highlighted,
            rows: None,
        }
    }

    /// Option index drawn at (x, y) on the last render.
    pub fn row_at(&self, x: u16, y: u16) -> Option<usize> {
        self.rows
            .filter(|rows| rows.contains(x, y))
            .map(|rows| usize::from(y - rows.y))
    }

    pub fn select_next(&mut self, count: usize) {
        if count > 0 {
            self.highlighted = (self.highlighted + 1).min(count - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }

    /// Route an event for a picker over `count` options.
    pub fn handle_event(&mut self, event: &Event, count: usize) -> PickerOutcome {
        match event {
            Event::Key(key) if key.is_press() => self.handle_key(key, count),
            Event::Mouse(mouse) => self.handle_mouse(mouse, count),
            _ => PickerOutcome::Ignored,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, count: usize) -> PickerOutcome {
        match key.code {
            KeyCode::Up => {
                self.select_previous();
                PickerOutcome::Moved
            }
            KeyCode::Down | KeyCode::Tab => {
                self.select_next(count);
                PickerOutcome::Moved
            }
            KeyCode::Enter if self.highlighted < count => {
                PickerOutcome::Chosen(self.highlighted)
            }
            KeyCode::Escape => PickerOutcome::Dismissed,
            _ => PickerOutcome::Ignored,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, count: usize) -> PickerOutcome {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.row_at(mouse.x, mouse.y).filter(|&i| i < count) {
                    Some(index) => {
                        self.highlighted = index;
                        PickerOutcome::Chosen(index)
                    }
                    None => PickerOutcome::Ignored,
                }
            }
            MouseEventKind::ScrollUp => {
                self.select_previous();
                PickerOutcome::Moved
            }
            MouseEventKind::ScrollDown => {
                self.select_next(count);
                PickerOutcome::Moved
            }
            _ => PickerOutcome::Ignored,
        }
    }
}

/// Picker overlay over a set of options.
#[derive(Debug, Clone)]
pub struct BackgroundPicker<'a> {
    options: &'a [BackgroundOption],
    active: Option<usize>,
}

impl<'a> BackgroundPicker<'a> {
    pub fn new(options: &'a [BackgroundOption]) -> Self {
        Self {
            options,
            active: None,
        }
    }

    /// Mark the background currently in use.
    #[must_use]
    pub fn active(mut self, index: usize) -> Self {
        self.active = Some(index);
        self
    }

    /// Panel rectangle within `area`.
    pub fn panel_area(&self, area: Rect) -> Rect {
        let widest = self
            .options
            .iter()
            .map(|o| display_width(o.name) as u16)
            .max()
            .unwrap_or(0);
        let width = (widest + SWATCH_COLUMNS + 8).max(MIN_WIDTH);
        // Title, blank, rows, blank, hint.
        let height = self.options.len() as u16 + 4;
        area.centered(width, height)
    }
}

impl StatefulWidget for BackgroundPicker<'_> {
    type State = PickerState;

    fn render(&self, area: Rect, frame: &mut Frame, state: &mut PickerState) {
        let _span = tracing::debug_span!("widget_render", widget = "BackgroundPicker").entered();
        let panel = self.panel_area(area);
        state.rows = None;
        if panel.is_empty() {
            return;
        }
        state.highlighted = state.highlighted.min(self.options.len().saturating_sub(1));

        frame.buffer.fill(
            panel,
            Cell {
                bg: PANEL_BG,
                ..Cell::from_char(' ')
            },
        );
        draw_centered(frame, panel, panel.y, TITLE, Style::new().fg(TITLE_FG).bold());

        for (i, option) in self.options.iter().enumerate() {
            let y = panel.y + 2 + i as u16;
            if y >= panel.bottom() {
                break;
            }
            let row = Rect::new(panel.x, y, panel.width, 1);
            let highlighted = i == state.highlighted;
            let row_bg = if highlighted { HIGHLIGHT_BG } else { PANEL_BG };
            frame.buffer.fill(
                row,
                Cell {
                    bg: row_bg,
                    ..Cell::from_char(' ')
                },
            );

            let marker = if highlighted { "›" } else { " " };
            let marker_style = Style::new().fg(TITLE_FG);
            let mut x = draw_text_span(frame, row.x + 1, y, marker, marker_style, row.right()) + 1;
            for col in 0..SWATCH_COLUMNS {
                let t = f32::from(col) / f32::from(SWATCH_COLUMNS - 1);
                let [from, to] = option.gradient;
                if let Some(cell) = frame.buffer.get_mut(x + col, y) {
                    cell.bg = from.lerp(to, t);
                }
            }
            x += SWATCH_COLUMNS + 1;
            let mut name_style = Style::new().fg(ITEM_FG);
            if highlighted {
                name_style = name_style.bold();
            }
            x = draw_text_span(frame, x, y, option.name, name_style, row.right());
            if self.active == Some(i) {
                draw_text_span(frame, x + 1, y, "✓", Style::new().fg(ITEM_FG), row.right());
            }
            frame.register_hit(row, PICKER_ROWS, HitRegion::ListItem, i as u64);
        }

        let rows = Rect::new(panel.x, panel.y + 2, panel.width, self.options.len() as u16);
        state.rows = Some(rows.intersection(&panel));

        if panel.height > 1 {
            draw_centered(frame, panel, panel.bottom() - 1, HINT, Style::new().fg(HINT_FG));
        }
    }
}
