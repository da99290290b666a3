#![forbid(unsafe_code)]

//! "Persona is typing" bubble with three blinking dots.

use beau_core::geometry::Rect;
use beau_render::cell::{Cell, PackedRgba};
use beau_render::frame::Frame;
use beau_render::style::Style;

use crate::message_list::PERSONA_AVATAR;
use crate::{Widget, draw_text_span};

const BUBBLE_BG: PackedRgba = PackedRgba::rgb(0xf2, 0xf2, 0xf2);
const DOT_FG: PackedRgba = PackedRgba::rgb(0x9c, 0xa3, 0xaf);

/// Typing indicator; `intensity` in [0, 1] drives the dot color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingIndicator {
    intensity: f32,
}

impl TypingIndicator {
    /// Rows the indicator occupies.
    pub const HEIGHT: u16 = 1;

    pub fn new(intensity: f32) -> Self {
        Self {
            intensity: intensity.clamp(0.0, 1.0),
        }
    }

    fn dot_color(&self) -> PackedRgba {
        // Dots never vanish completely.
        BUBBLE_BG.lerp(DOT_FG, 0.3 + 0.7 * self.intensity)
    }
}

impl Widget for TypingIndicator {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        let x = draw_text_span(frame, area.x, area.y, PERSONA_AVATAR, Style::new(), area.right());
        let bubble = Rect::new(x + 1, area.y, 7, 1).intersection(&area);
        frame.buffer.fill(
            bubble,
            Cell {
                bg: BUBBLE_BG,
                ..Cell::from_char(' ')
            },
        );
        draw_text_span(
            frame,
            bubble.x + 1,
            area.y,
            "● ● ●",
            Style::new().fg(self.dot_color()).bg(BUBBLE_BG),
            bubble.right(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_avatar_and_dots() {
        let mut frame = Frame::new(20, 1);
        TypingIndicator::new(1.0).render(Rect::new(0, 0, 20, 1), &mut frame);
        let row = frame.buffer.row_text(0);
        assert!(row.starts_with(PERSONA_AVATAR));
        assert_eq!(row.matches('●').count(), 3);
    }

    #[test]
    fn intensity_changes_dot_color() {
        let dim = TypingIndicator::new(0.0).dot_color();
        let bright = TypingIndicator::new(1.0).dot_color();
        assert_ne!(dim, bright);
        assert_eq!(bright, DOT_FG);
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(TypingIndicator::new(5.0), TypingIndicator::new(1.0));
    }
}
