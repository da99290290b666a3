#![forbid(unsafe_code)]

//! Chat header: persona avatar, name, role and online status.

use beau_core::geometry::Rect;
use beau_render::cell::{Cell, PackedRgba};
use beau_render::display_width;
use beau_render::frame::Frame;
use beau_render::style::Style;

use crate::{Widget, draw_text_span, set_style_area};

pub const AVATAR: &str = "💙";
pub const TITLE: &str = "Beau";
pub const SUBTITLE: &str = "Your Relationship Coach";
pub const STATUS: &str = "● Online";

const HEADER_BG: PackedRgba = PackedRgba::rgb(0xfa, 0xfa, 0xfa);
const TITLE_FG: PackedRgba = PackedRgba::rgb(0x1f, 0x29, 0x37);
const SUBTITLE_FG: PackedRgba = PackedRgba::rgb(0x6b, 0x72, 0x80);
const STATUS_FG: PackedRgba = PackedRgba::rgb(0x10, 0xb9, 0x81);
const STATUS_PULSE_FG: PackedRgba = PackedRgba::rgb(0x6e, 0xe7, 0xb7);
const AVATAR_BG: PackedRgba = PackedRgba::rgb(0xe0, 0xe5, 0xfb);
const AVATAR_PULSE_BG: PackedRgba = PackedRgba::rgb(0xc2, 0xcb, 0xf7);

/// Header bar. `pulse` in [0, 1] tints the avatar ring and status dot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Header {
    pulse: f32,
}

impl Header {
    /// Rows the header occupies.
    pub const HEIGHT: u16 = 3;

    pub fn new(pulse: f32) -> Self {
        Self {
            pulse: pulse.clamp(0.0, 1.0),
        }
    }
}

impl Widget for Header {
    fn render(&self, area: Rect, frame: &mut Frame) {
        let _span = tracing::debug_span!("widget_render", widget = "Header").entered();
        if area.is_empty() {
            return;
        }
        frame.buffer.fill(
            area,
            Cell {
                bg: HEADER_BG,
                ..Cell::from_char(' ')
            },
        );

        let row = area.y + area.height.saturating_sub(1).min(1);
        let avatar_bg = AVATAR_BG.lerp(AVATAR_PULSE_BG, self.pulse);
        let ring = Rect::new(area.x + 1, row, 4, 1).intersection(&area);
        set_style_area(frame, ring, Style::new().bg(avatar_bg));
        draw_text_span(frame, area.x + 2, row, AVATAR, Style::new().bg(avatar_bg), ring.right());

        let text_x = area.x + 6;
        draw_text_span(
            frame,
            text_x,
            area.y,
            TITLE,
            Style::new().fg(TITLE_FG).bold(),
            area.right(),
        );
        if area.height > 1 {
            draw_text_span(
                frame,
                text_x,
                area.y + 1,
                SUBTITLE,
                Style::new().fg(SUBTITLE_FG),
                area.right(),
            );
        }

        let status_width = display_width(STATUS) as u16;
        if area.width > text_x - area.x + display_width(TITLE) as u16 + status_width + 2 {
            let x = area.right() - status_width - 1;
            let dot = STATUS_FG.lerp(STATUS_PULSE_FG, self.pulse);
            let after_dot = draw_text_span(frame, x, area.y, "●", Style::new().fg(dot), area.right());
            draw_text_span(
                frame,
                after_dot,
                area.y,
                &STATUS['●'.len_utf8()..],
                Style::new().fg(STATUS_FG),
                area.right(),
            );
        }
    }
}
