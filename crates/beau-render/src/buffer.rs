#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! The `Buffer` is a 2D grid of [`Cell`]s representing the terminal display.
//!
//! # Layout
//!
//! Cells are stored in row-major order: `index = y * width + x`.
//!
//! # Invariants
//!
//! 1. `cells.len() == width * height`
//! 2. Width and height never change after creation
//! 3. A wide character is written together with its continuation cells, or
//!    not at all

use beau_core::geometry::Rect;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, CellContent};
use crate::grapheme_width;
use crate::style::Style;

/// A 2D grid of terminal cells.
///
/// # Example
///
/// ```
/// use beau_render::buffer::Buffer;
/// use beau_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// buffer.set(1, 0, Cell::from_char('i'));
/// assert_eq!(buffer.row_text(0).trim_end(), "Hi");
/// ```
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a new buffer of empty cells.
    ///
    /// # Panics
    ///
    /// Panics if width or height is 0.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0, "buffer width must be > 0");
        assert!(height > 0, "buffer height must be > 0");
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Buffer width in cells.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bounding rect of the entire buffer.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Cell at (x, y), or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at (x, y), or `None` when out of bounds.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Set the cell at (x, y).
    ///
    /// The column count comes from the cell's character. See
    /// [`Buffer::set_with_width`].
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let width = match cell.content {
            CellContent::Char(c) => c.width().unwrap_or(0),
            _ => 1,
        };
        self.set_with_width(x, y, cell, width);
    }

    /// Set the cell at (x, y), occupying `width` columns.
    ///
    /// - Out-of-bounds writes are ignored.
    /// - A transparent background keeps the background already in place.
    /// - Wide writes are atomic: if the trailing columns do not fit, nothing
    ///   is written. Trailing columns become [`Cell::CONTINUATION`] carrying
    ///   the head's background.
    pub fn set_with_width(&mut self, x: u16, y: u16, cell: Cell, width: usize) {
        let width = width.max(1);
        if y >= self.height || x as usize + width > self.width as usize {
            return;
        }

        for i in 0..width {
            self.clear_overlap(x + i as u16, y);
        }

        let Some(idx) = self.index(x, y) else {
            return;
        };
        let mut head = cell;
        if head.bg.a() == 0 {
            head.bg = self.cells[idx].bg;
        }
        self.cells[idx] = head;

        for i in 1..width {
            if let Some(tail) = self.index(x + i as u16, y) {
                self.cells[tail] = Cell {
                    bg: head.bg,
                    ..Cell::CONTINUATION
                };
            }
        }
    }

    /// Break up any wide character overlapping (x, y) before it is replaced.
    fn clear_overlap(&mut self, x: u16, y: u16) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        match self.cells[idx].content {
            CellContent::Continuation => {
                let mut cx = x;
                while cx > 0 {
                    cx -= 1;
                    let Some(i) = self.index(cx, y) else { break };
                    let bg = self.cells[i].bg;
                    let was_head = !matches!(self.cells[i].content, CellContent::Continuation);
                    self.cells[i] = Cell {
                        bg,
                        ..Cell::default()
                    };
                    if was_head {
                        break;
                    }
                }
                self.scrub_tail(x + 1, y);
            }
            CellContent::Char(_) => self.scrub_tail(x + 1, y),
            CellContent::Empty => {}
        }
    }

    fn scrub_tail(&mut self, mut x: u16, y: u16) {
        while let Some(i) = self.index(x, y) {
            if !matches!(self.cells[i].content, CellContent::Continuation) {
                break;
            }
            let bg = self.cells[i].bg;
            self.cells[i] = Cell {
                bg,
                ..Cell::default()
            };
            x += 1;
        }
    }

    /// Fill a rectangular region with the given cell.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = self.bounds().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = cell;
                }
            }
        }
    }

    /// Apply a style to every cell in `rect`, keeping content.
    pub fn set_style(&mut self, rect: Rect, style: Style) {
        if style.is_empty() {
            return;
        }
        let clipped = self.bounds().intersection(&rect);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                if let Some(cell) = self.get_mut(x, y) {
                    style.apply_to(cell);
                }
            }
        }
    }

    /// Draw `text` starting at (x, y), clipped to `max_x` (exclusive).
    ///
    /// Each grapheme is stored as its first scalar and spans its display
    /// width. Returns the column after the last drawn grapheme.
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width);
        let mut cx = x;
        for grapheme in text.graphemes(true) {
            let Some(c) = grapheme.chars().next() else {
                continue;
            };
            let width = grapheme_width(grapheme);
            if width == 0 {
                continue;
            }
            if cx as usize + width > max_x as usize {
                break;
            }
            let mut cell = Cell::from_char(c);
            style.apply_to(&mut cell);
            self.set_with_width(cx, y, cell, width);
            cx += width as u16;
        }
        cx
    }

    /// Reset every cell to the default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Text content of row `y`; empty cells read as spaces, continuation
    /// cells are skipped.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter_map(|cell| match cell.content {
                CellContent::Char(c) => Some(c),
                CellContent::Empty => Some(' '),
                CellContent::Continuation => None,
            })
            .collect()
    }

    /// Every row's text joined with newlines.
    pub fn text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if two buffers have identical content.
    pub fn content_eq(&self, other: &Buffer) -> bool {
        self.width == other.width && self.height == other.height && self.cells == other.cells
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.content_eq(other)
    }
}

impl Eq for Buffer {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::PackedRgba;

    #[test]
    fn set_and_get() {
        let mut buf = Buffer::new(4, 2);
        buf.set(1, 1, Cell::from_char('x'));
        assert_eq!(buf.get(1, 1).and_then(|c| c.content.as_char()), Some('x'));
        assert!(buf.get(4, 0).is_none());
    }

    #[test]
    fn out_of_bounds_set_is_ignored() {
        let mut buf = Buffer::new(2, 2);
        let before = buf.clone();
        buf.set(5, 5, Cell::from_char('x'));
        assert_eq!(buf, before);
    }

    #[test]
    fn wide_char_writes_continuation() {
        let mut buf = Buffer::new(4, 1);
        buf.set(0, 0, Cell::from_char('中'));
        assert_eq!(buf.get(1, 0).map(|c| c.content), Some(CellContent::Continuation));
        assert_eq!(buf.row_text(0), "中  ");
    }

    #[test]
    fn wide_char_at_edge_is_not_written() {
        let mut buf = Buffer::new(3, 1);
        buf.set(2, 0, Cell::from_char('中'));
        assert!(buf.get(2, 0).is_some_and(Cell::is_empty));
    }

    #[test]
    fn overwriting_continuation_clears_head() {
        let mut buf = Buffer::new(4, 1);
        buf.set(0, 0, Cell::from_char('中'));
        buf.set(1, 0, Cell::from_char('a'));
        assert!(buf.get(0, 0).is_some_and(Cell::is_empty));
        assert_eq!(buf.row_text(0), " a  ");
    }

    #[test]
    fn transparent_bg_keeps_existing() {
        let mut buf = Buffer::new(2, 1);
        let blue = PackedRgba::rgb(0, 0, 200);
        buf.fill(
            buf.bounds(),
            Cell {
                bg: blue,
                ..Cell::default()
            },
        );
        buf.set(0, 0, Cell::from_char('a'));
        assert_eq!(buf.get(0, 0).map(|c| c.bg), Some(blue));
    }

    #[test]
    fn draw_text_clips_and_reports_end() {
        let mut buf = Buffer::new(10, 1);
        let end = buf.draw_text(2, 0, "hello world", Style::new(), 8);
        assert_eq!(end, 8);
        assert_eq!(buf.row_text(0), "  hello   ");
    }

    #[test]
    fn draw_text_handles_emoji() {
        let mut buf = Buffer::new(6, 1);
        let end = buf.draw_text(0, 0, "💙ab", Style::new(), 6);
        assert_eq!(end, 4);
        assert_eq!(buf.row_text(0), "💙ab  ");
    }

    #[test]
    fn set_style_keeps_content() {
        let mut buf = Buffer::new(3, 1);
        buf.draw_text(0, 0, "abc", Style::new(), 3);
        buf.set_style(buf.bounds(), Style::new().bold());
        assert_eq!(buf.row_text(0), "abc");
        assert!(buf.cells().iter().all(|c| c.attrs.contains(crate::cell::StyleFlags::BOLD)));
    }
}
