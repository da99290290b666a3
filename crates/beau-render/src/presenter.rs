#![forbid(unsafe_code)]

//! Presenter: state-tracked terminal output.
//!
//! The presenter compares the next frame with the last one it drew and
//! emits crossterm commands only for cells that changed. Style state is
//! tracked so colors and attributes are only re-sent when they differ from
//! the previous emitted cell. All output is queued and flushed once per
//! frame.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};

use crate::buffer::Buffer;
use crate::cell::{Cell, CellContent, PackedRgba, StyleFlags};
use crate::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    attrs: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs,
        }
    }
}

fn to_color(color: PackedRgba) -> Color {
    if color.a() == 0 {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r(),
            g: color.g(),
            b: color.b(),
        }
    }
}

/// Diffing presenter over any writer.
#[derive(Debug)]
pub struct Presenter<W: Write> {
    writer: W,
    previous: Option<Buffer>,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter. The first frame is always drawn in full.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            previous: None,
        }
    }

    /// Forget the last frame so the next present redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Draw `frame`, emitting only changed cells.
    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        let next = &frame.buffer;
        let full = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != next.width() || prev.height() != next.height());

        queue!(self.writer, Hide)?;
        if full {
            queue!(self.writer, ResetColor, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
        }

        let mut style: Option<CellStyle> = None;
        let mut cursor: Option<(u16, u16)> = None;
        for y in 0..next.height() {
            for x in 0..next.width() {
                let Some(cell) = next.get(x, y) else { continue };
                if matches!(cell.content, CellContent::Continuation) {
                    continue;
                }
                let unchanged = !full
                    && self.previous.as_ref().is_some_and(|prev| {
                        prev.get(x, y) == Some(cell) && !continuation_changed(prev, next, x, y)
                    });
                if unchanged {
                    continue;
                }

                if cursor != Some((x, y)) {
                    queue!(self.writer, MoveTo(x, y))?;
                }
                let wanted = CellStyle::from_cell(cell);
                if style != Some(wanted) {
                    self.emit_style(wanted)?;
                    style = Some(wanted);
                }
                let ch = cell.content.as_char().unwrap_or(' ');
                queue!(self.writer, Print(ch))?;
                let advance = 1 + continuation_run(next, x, y);
                cursor = Some((x.saturating_add(advance), y));
            }
        }

        queue!(self.writer, ResetColor, SetAttribute(Attribute::Reset))?;
        if let (Some((x, y)), true) = (frame.cursor_position, frame.cursor_visible) {
            queue!(self.writer, MoveTo(x, y), Show)?;
        }
        self.writer.flush()?;
        self.previous = Some(next.clone());
        Ok(())
    }

    fn emit_style(&mut self, style: CellStyle) -> io::Result<()> {
        queue!(
            self.writer,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(to_color(style.fg)),
            SetBackgroundColor(to_color(style.bg)),
        )?;
        let attrs = [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
        ];
        for (flag, attr) in attrs {
            if style.attrs.contains(flag) {
                queue!(self.writer, SetAttribute(attr))?;
            }
        }
        Ok(())
    }

    /// Consume the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Whether the continuation cells trailing (x, y) differ from last frame.
fn continuation_changed(prev: &Buffer, next: &Buffer, x: u16, y: u16) -> bool {
    let run = continuation_run(next, x, y);
    (1..=run).any(|i| prev.get(x + i, y) != next.get(x + i, y))
}

fn continuation_run(buffer: &Buffer, x: u16, y: u16) -> u16 {
    let mut run = 0;
    while buffer
        .get(x + run + 1, y)
        .is_some_and(|c| matches!(c.content, CellContent::Continuation))
    {
        run += 1;
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn present_to_string(presenter: &mut Presenter<Vec<u8>>, frame: &Frame) -> String {
        presenter.present(frame).expect("write to Vec never fails");
        let out = String::from_utf8_lossy(&presenter.writer).into_owned();
        presenter.writer.clear();
        out
    }

    #[test]
    fn first_present_draws_everything() {
        let mut frame = Frame::new(5, 1);
        frame.buffer.draw_text(0, 0, "hi", Style::new(), 5);
        let mut presenter = Presenter::new(Vec::new());
        let out = present_to_string(&mut presenter, &frame);
        assert!(out.contains('h'));
        assert!(out.contains('i'));
        assert!(out.contains("\x1b[2J"));
    }

    #[test]
    fn unchanged_frame_emits_no_cells() {
        let mut frame = Frame::new(5, 1);
        frame.buffer.draw_text(0, 0, "hi", Style::new(), 5);
        let mut presenter = Presenter::new(Vec::new());
        present_to_string(&mut presenter, &frame);
        let out = present_to_string(&mut presenter, &frame);
        assert!(!out.contains('h'));
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn changed_cell_is_redrawn() {
        let mut frame = Frame::new(5, 1);
        frame.buffer.draw_text(0, 0, "hi", Style::new(), 5);
        let mut presenter = Presenter::new(Vec::new());
        present_to_string(&mut presenter, &frame);
        frame.buffer.draw_text(1, 0, "o", Style::new(), 5);
        let out = present_to_string(&mut presenter, &frame);
        assert!(out.contains('o'));
        assert!(!out.contains('h'));
    }

    #[test]
    fn rgb_colors_are_emitted() {
        let mut frame = Frame::new(1, 1);
        frame
            .buffer
            .draw_text(0, 0, "x", Style::new().fg(PackedRgba::rgb(1, 2, 3)), 1);
        let mut presenter = Presenter::new(Vec::new());
        let out = present_to_string(&mut presenter, &frame);
        assert!(out.contains("38;2;1;2;3"));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut presenter = Presenter::new(Vec::new());
        present_to_string(&mut presenter, &Frame::new(3, 1));
        let out = present_to_string(&mut presenter, &Frame::new(4, 1));
        assert!(out.contains("\x1b[2J"));
    }
}
