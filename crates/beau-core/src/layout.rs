#![forbid(unsafe_code)]

//! One-dimensional constraint layout.
//!
//! [`Flex`] splits a [`Rect`] along one axis. Fixed and percentage sizes are
//! honored first, then `Min` items receive their minimum, and whatever is
//! left is shared evenly between `Min` and `Fill` items.

use crate::geometry::{Rect, Sides};

/// Size constraint for one slot of a [`Flex`] layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// An exact size in cells.
    Fixed(u16),
    /// A percentage of the total available size (0.0 to 100.0).
    Percentage(f32),
    /// A minimum size in cells; grows to share leftover space.
    Min(u16),
    /// Fill remaining space.
    Fill,
}

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// A flexible layout container.
#[derive(Debug, Clone, Default)]
pub struct Flex {
    direction: Direction,
    constraints: Vec<Constraint>,
    margin: Sides,
    gap: u16,
}

impl Flex {
    /// Create a new vertical flex layout.
    pub fn vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            ..Default::default()
        }
    }

    /// Create a new horizontal flex layout.
    pub fn horizontal() -> Self {
        Self {
            direction: Direction::Horizontal,
            ..Default::default()
        }
    }

    /// Set the constraints.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints = constraints.into_iter().collect();
        self
    }

    /// Set the margin.
    pub fn margin(mut self, margin: Sides) -> Self {
        self.margin = margin;
        self
    }

    /// Set the gap between items.
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    /// Split the given area into one rectangle per constraint.
    pub fn split(&self, area: Rect) -> Vec<Rect> {
        let inner = area.inner(self.margin);
        if inner.is_empty() {
            return self.constraints.iter().map(|_| Rect::default()).collect();
        }
        let count = self.constraints.len();
        if count == 0 {
            return Vec::new();
        }

        let total = match self.direction {
            Direction::Horizontal => inner.width,
            Direction::Vertical => inner.height,
        };
        let gaps = (count as u64 - 1).saturating_mul(u64::from(self.gap));
        let available = total.saturating_sub(gaps.min(u64::from(u16::MAX)) as u16);
        let sizes = solve_constraints(&self.constraints, available);

        let mut pos = match self.direction {
            Direction::Horizontal => inner.x,
            Direction::Vertical => inner.y,
        };
        let mut rects = Vec::with_capacity(count);
        for size in sizes {
            rects.push(match self.direction {
                Direction::Horizontal => Rect::new(pos, inner.y, size, inner.height),
                Direction::Vertical => Rect::new(inner.x, pos, inner.width, size),
            });
            pos = pos.saturating_add(size).saturating_add(self.gap);
        }
        rects
    }
}

fn solve_constraints(constraints: &[Constraint], available: u16) -> Vec<u16> {
    let mut sizes = vec![0u16; constraints.len()];
    let mut remaining = available;

    for (i, c) in constraints.iter().enumerate() {
        let wanted = match *c {
            Constraint::Fixed(n) => n,
            Constraint::Percentage(p) => {
                let p = p.clamp(0.0, 100.0);
                (f32::from(available) * p / 100.0).floor() as u16
            }
            Constraint::Min(n) => n,
            Constraint::Fill => 0,
        };
        let granted = wanted.min(remaining);
        sizes[i] = granted;
        remaining -= granted;
    }

    let growable: Vec<usize> = constraints
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Constraint::Min(_) | Constraint::Fill))
        .map(|(i, _)| i)
        .collect();
    if !growable.is_empty() && remaining > 0 {
        let share = remaining / growable.len() as u16;
        let mut extra = remaining % growable.len() as u16;
        for i in growable {
            sizes[i] = sizes[i].saturating_add(share);
            if extra > 0 {
                sizes[i] = sizes[i].saturating_add(1);
                extra -= 1;
            }
        }
    }
    sizes
}
