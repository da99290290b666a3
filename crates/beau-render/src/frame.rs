#![forbid(unsafe_code)]

//! Frame = Buffer + metadata for a render pass.
//!
//! The `Frame` is the render target that `Model::view()` methods write to.
//! It bundles the cell grid ([`Buffer`]) with metadata for cursor and
//! mouse hit testing.
//!
//! # Usage
//!
//! ```
//! use beau_render::frame::Frame;
//! use beau_render::cell::Cell;
//!
//! let mut frame = Frame::new(80, 24);
//! frame.buffer.set(0, 0, Cell::from_char('H'));
//! frame.buffer.set(1, 0, Cell::from_char('i'));
//! frame.set_cursor(Some((2, 0)));
//! ```

use beau_core::geometry::Rect;

use crate::buffer::Buffer;

/// Identifier for a clickable region in the hit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HitId(pub u32);

impl HitId {
    /// Create a new hit ID from a raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw ID value.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Opaque user data for hit callbacks.
pub type HitData = u64;

/// Regions within a widget for mouse interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitRegion {
    /// No interactive region.
    #[default]
    None,
    /// Main content area.
    Content,
    /// Clickable button.
    Button,
    /// An entry in a list.
    ListItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HitCell {
    widget_id: Option<HitId>,
    region: HitRegion,
    data: HitData,
}

/// Hit testing grid for mouse interaction.
///
/// Maps screen positions to widget IDs. Later registrations win.
#[derive(Debug, Clone)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<HitCell>,
}

impl HitGrid {
    /// Create an empty hit grid with the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![HitCell::default(); width as usize * height as usize],
        }
    }

    /// Register a clickable region. Cells outside the grid are ignored.
    pub fn register(&mut self, rect: Rect, widget_id: HitId, region: HitRegion, data: HitData) {
        let x_end = (rect.x as usize + rect.width as usize).min(self.width as usize);
        let y_end = (rect.y as usize + rect.height as usize).min(self.height as usize);
        if rect.x as usize >= x_end || rect.y as usize >= y_end {
            return;
        }

        let hit = HitCell {
            widget_id: Some(widget_id),
            region,
            data,
        };
        for y in rect.y as usize..y_end {
            let row_start = y * self.width as usize;
            self.cells[row_start + rect.x as usize..row_start + x_end].fill(hit);
        }
    }

    /// Hit test at the given position.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cell = self.cells[y as usize * self.width as usize + x as usize];
        cell.widget_id.map(|id| (id, cell.region, cell.data))
    }

    /// Clear all hit regions.
    pub fn clear(&mut self) {
        self.cells.fill(HitCell::default());
    }

    /// Clear the hit regions inside `rect`.
    pub fn clear_rect(&mut self, rect: Rect) {
        let x_end = (rect.x as usize + rect.width as usize).min(self.width as usize);
        let y_end = (rect.y as usize + rect.height as usize).min(self.height as usize);
        if rect.x as usize >= x_end {
            return;
        }
        for y in rect.y as usize..y_end {
            let row_start = y * self.width as usize;
            self.cells[row_start + rect.x as usize..row_start + x_end].fill(HitCell::default());
        }
    }
}

/// The render target for one pass.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The cell grid for this render pass.
    pub buffer: Buffer,

    /// Optional hit grid for mouse hit testing.
    ///
    /// When `Some`, widgets can register clickable regions.
    pub hit_grid: Option<HitGrid>,

    /// Cursor position (if the app wants to show a cursor).
    pub cursor_position: Option<(u16, u16)>,

    /// Whether the cursor should be visible.
    pub cursor_visible: bool,
}

impl Frame {
    /// Create a new frame with no hit grid and no cursor position.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: None,
            cursor_position: None,
            cursor_visible: true,
        }
    }

    /// Create a frame with hit testing enabled.
    pub fn with_hit_grid(width: u16, height: u16) -> Self {
        let mut frame = Self::new(width, height);
        frame.hit_grid = Some(HitGrid::new(width, height));
        frame
    }

    /// Frame width in cells.
    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    /// Frame height in cells.
    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// Bounding rectangle of the frame.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    /// Reset buffer, hit grid and cursor for the next render.
    pub fn clear(&mut self) {
        self.buffer.clear();
        if let Some(grid) = self.hit_grid.as_mut() {
            grid.clear();
        }
        self.cursor_position = None;
    }

    /// Set cursor position. `None` hides the cursor for this frame.
    #[inline]
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor_position = position;
    }

    /// Set cursor visibility.
    #[inline]
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    /// Register a hit region (if hit grid is enabled).
    ///
    /// Returns `true` if the region was registered, `false` if no hit grid.
    pub fn register_hit(&mut self, rect: Rect, id: HitId, region: HitRegion, data: HitData) -> bool {
        let bounds = self.bounds();
        match self.hit_grid.as_mut() {
            Some(grid) => {
                let clipped = rect.intersection(&bounds);
                if !clipped.is_empty() {
                    grid.register(clipped, id, region, data);
                }
                true
            }
            None => false,
        }
    }

    /// Hit test at the given position (if hit grid is enabled).
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        self.hit_grid.as_ref().and_then(|grid| grid.hit_test(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_grid_registers_and_tests() {
        let mut grid = HitGrid::new(10, 5);
        grid.register(Rect::new(2, 1, 3, 2), HitId::new(7), HitRegion::Button, 42);
        assert_eq!(grid.hit_test(2, 1), Some((HitId(7), HitRegion::Button, 42)));
        assert_eq!(grid.hit_test(4, 2), Some((HitId(7), HitRegion::Button, 42)));
        assert_eq!(grid.hit_test(5, 1), None);
        assert_eq!(grid.hit_test(99, 99), None);
        grid.clear();
        assert_eq!(grid.hit_test(2, 1), None);
    }

    #[test]
    fn clear_rect_only_touches_rect() {
        let mut grid = HitGrid::new(4, 2);
        grid.register(Rect::new(0, 0, 4, 2), HitId(1), HitRegion::Content, 0);
        grid.clear_rect(Rect::new(1, 0, 2, 1));
        assert_eq!(grid.hit_test(1, 0), None);
        assert_eq!(grid.hit_test(2, 0), None);
        assert!(grid.hit_test(0, 0).is_some());
        assert!(grid.hit_test(1, 1).is_some());
    }

    #[test]
    fn later_registration_wins() {
        let mut grid = HitGrid::new(4, 1);
        grid.register(Rect::new(0, 0, 4, 1), HitId(1), HitRegion::Content, 0);
        grid.register(Rect::new(1, 0, 1, 1), HitId(2), HitRegion::Button, 0);
        assert_eq!(grid.hit_test(1, 0).map(|h| h.0), Some(HitId(2)));
        assert_eq!(grid.hit_test(0, 0).map(|h| h.0), Some(HitId(1)));
    }

    #[test]
    fn frame_without_grid_reports_unregistered() {
        let mut frame = Frame::new(4, 4);
        assert!(!frame.register_hit(Rect::new(0, 0, 1, 1), HitId(1), HitRegion::Button, 0));
        assert_eq!(frame.hit_test(0, 0), None);
    }

    #[test]
    fn frame_clips_hits_to_bounds() {
        let mut frame = Frame::with_hit_grid(4, 2);
        assert!(frame.register_hit(Rect::new(2, 0, 10, 10), HitId(3), HitRegion::Button, 1));
        assert!(frame.hit_test(3, 1).is_some());
        assert!(frame.hit_test(1, 1).is_none());
    }

    #[test]
    fn clear_resets_cursor_and_hits() {
        let mut frame = Frame::with_hit_grid(4, 2);
        frame.set_cursor(Some((1, 1)));
        frame.register_hit(Rect::new(0, 0, 4, 2), HitId(1), HitRegion::Content, 0);
        frame.clear();
        assert_eq!(frame.cursor_position, None);
        assert_eq!(frame.hit_test(0, 0), None);
    }
}
