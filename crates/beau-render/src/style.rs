#![forbid(unsafe_code)]

//! Optional style overlays applied onto cells.

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// A partial style: each `None` field leaves the cell's value untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color.
    pub fg: Option<PackedRgba>,
    /// Background color.
    pub bg: Option<PackedRgba>,
    /// Style flags added to the cell.
    pub attrs: Option<StyleFlags>,
}

impl Style {
    /// An empty style.
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: None,
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add bold.
    #[must_use]
    pub fn bold(self) -> Self {
        self.flag(StyleFlags::BOLD)
    }

    /// Add dim.
    #[must_use]
    pub fn dim(self) -> Self {
        self.flag(StyleFlags::DIM)
    }

    /// Add italic.
    #[must_use]
    pub fn italic(self) -> Self {
        self.flag(StyleFlags::ITALIC)
    }

    /// Add underline.
    #[must_use]
    pub fn underline(self) -> Self {
        self.flag(StyleFlags::UNDERLINE)
    }

    /// Add reverse video.
    #[must_use]
    pub fn reverse(self) -> Self {
        self.flag(StyleFlags::REVERSE)
    }

    fn flag(mut self, flag: StyleFlags) -> Self {
        self.attrs = Some(self.attrs.unwrap_or_default() | flag);
        self
    }

    /// Whether the style changes nothing.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_none()
    }

    /// Apply the style onto a cell, keeping its content.
    pub fn apply_to(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        if let Some(attrs) = self.attrs {
            cell.attrs |= attrs;
        }
    }
}
