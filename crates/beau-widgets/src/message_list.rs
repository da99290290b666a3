#![forbid(unsafe_code)]

//! Chat transcript: message bubbles laid out bottom-up with scrolling.
//!
//! User messages are right-aligned; persona messages are left-aligned behind
//! an avatar. Bubbles wrap to at most 80% of the list width and carry an
//! `HH:MM` label on their last row.

use beau_core::geometry::Rect;
use beau_render::cell::{Cell, PackedRgba};
use beau_render::display_width;
use beau_render::frame::Frame;
use beau_render::style::Style;
use beau_render::text::wrap;
use time::{OffsetDateTime, UtcOffset};

use crate::Widget;
use crate::draw_text_span;
use crate::typing_indicator::TypingIndicator;

/// Avatar drawn beside persona messages.
pub const PERSONA_AVATAR: &str = "💜";

const AVATAR_COLUMNS: u16 = 3;
const BUBBLE_PADDING: u16 = 1;
const MESSAGE_GAP: u16 = 1;

const USER_BG: PackedRgba = PackedRgba::rgb(0x66, 0x7e, 0xea);
const USER_FG: PackedRgba = PackedRgba::WHITE;
const PERSONA_BG: PackedRgba = PackedRgba::rgb(0xf2, 0xf2, 0xf2);
const PERSONA_FG: PackedRgba = PackedRgba::rgb(0x1f, 0x29, 0x37);
const USER_TIME_FG: PackedRgba = PackedRgba::rgb(0xd6, 0xdc, 0xfa);
const PERSONA_TIME_FG: PackedRgba = PackedRgba::rgb(0x6b, 0x72, 0x80);

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Author {
    User,
    Persona,
}

/// One entry in the transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Strictly increasing within a session.
    pub id: u64,
    pub text: String,
    pub author: Author,
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    /// `HH:MM` in the given offset.
    pub fn clock_label(&self, offset: UtcOffset) -> String {
        let local = self.timestamp.to_offset(offset);
        format!("{:02}:{:02}", local.hour(), local.minute())
    }
}

/// A bubble laid out for a given list width.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BubbleLayout {
    lines: Vec<String>,
    label: String,
    /// Bubble width including padding.
    width: u16,
}

impl BubbleLayout {
    fn height(&self) -> u16 {
        self.lines.len() as u16 + 1
    }
}

fn layout_bubble(message: &ChatMessage, list_width: u16, offset: UtcOffset) -> BubbleLayout {
    let max_bubble = (list_width as u32 * 4 / 5) as u16;
    let avatar = if message.author == Author::Persona {
        AVATAR_COLUMNS
    } else {
        0
    };
    let max_bubble = max_bubble.min(list_width.saturating_sub(avatar)).max(3);
    let text_width = max_bubble.saturating_sub(BUBBLE_PADDING * 2).max(1);

    let lines = wrap(&message.text, text_width as usize);
    let label = message.clock_label(offset);
    let widest = lines
        .iter()
        .map(|l| display_width(l))
        .chain(std::iter::once(display_width(&label)))
        .max()
        .unwrap_or(0) as u16;
    BubbleLayout {
        lines,
        label,
        width: (widest + BUBBLE_PADDING * 2).min(max_bubble),
    }
}

/// Rows the whole transcript occupies at `width`, gaps included.
pub fn content_height(
    messages: &[ChatMessage],
    width: u16,
    typing: bool,
    offset: UtcOffset,
) -> u16 {
    let bubbles: u32 = messages
        .iter()
        .map(|m| u32::from(layout_bubble(m, width, offset).height()))
        .sum();
    let blocks = messages.len() as u32 + u32::from(typing);
    let gaps = blocks.saturating_sub(1) * u32::from(MESSAGE_GAP);
    let typing_rows = if typing { u32::from(TypingIndicator::HEIGHT) } else { 0 };
    (bubbles + gaps + typing_rows).min(u32::from(u16::MAX)) as u16
}

/// Transcript view.
///
/// `scroll_from_bottom` counts rows scrolled up from the newest message;
/// zero follows the bottom. Values past the top are clamped.
#[derive(Debug, Clone)]
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    scroll_from_bottom: u16,
    typing: Option<TypingIndicator>,
    offset: UtcOffset,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [ChatMessage]) -> Self {
        Self {
            messages,
            scroll_from_bottom: 0,
            typing: None,
            offset: UtcOffset::UTC,
        }
    }

    #[must_use]
    pub fn scroll_from_bottom(mut self, rows: u16) -> Self {
        self.scroll_from_bottom = rows;
        self
    }

    /// Show a typing indicator below the newest message.
    #[must_use]
    pub fn typing(mut self, indicator: Option<TypingIndicator>) -> Self {
        self.typing = indicator;
        self
    }

    /// Offset used for clock labels.
    #[must_use]
    pub fn utc_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Largest useful `scroll_from_bottom` for a viewport of `area`.
    pub fn max_scroll(&self, area: Rect) -> u16 {
        content_height(self.messages, area.width, self.typing.is_some(), self.offset)
            .saturating_sub(area.height)
    }

    fn draw_bubble(
        &self,
        frame: &mut Frame,
        area: Rect,
        message: &ChatMessage,
        layout: &BubbleLayout,
        top: i32,
    ) {
        let (bg, fg, time_fg) = match message.author {
            Author::User => (USER_BG, USER_FG, USER_TIME_FG),
            Author::Persona => (PERSONA_BG, PERSONA_FG, PERSONA_TIME_FG),
        };
        let x = match message.author {
            Author::User => area.right().saturating_sub(layout.width),
            Author::Persona => area.x + AVATAR_COLUMNS,
        };
        let text_style = Style::new().fg(fg).bg(bg);
        let right = x + layout.width;

        for row in 0..layout.height() {
            let y = top + i32::from(row);
            if y < i32::from(area.y) || y >= i32::from(area.bottom()) {
                continue;
            }
            let y = y as u16;
            frame.buffer.fill(
                Rect::new(x, y, layout.width, 1),
                Cell {
                    bg,
                    ..Cell::from_char(' ')
                },
            );
            let text_x = x + BUBBLE_PADDING;
            if let Some(line) = layout.lines.get(row as usize) {
                draw_text_span(frame, text_x, y, line, text_style, right);
            } else {
                let label_x = right
                    .saturating_sub(BUBBLE_PADDING)
                    .saturating_sub(display_width(&layout.label) as u16)
                    .max(text_x);
                draw_text_span(
                    frame,
                    label_x,
                    y,
                    &layout.label,
                    Style::new().fg(time_fg).bg(bg),
                    right,
                );
            }
            if row == 0 && message.author == Author::Persona {
                draw_text_span(frame, area.x, y, PERSONA_AVATAR, Style::new(), x);
            }
        }
    }
}

impl Widget for MessageList<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "MessageList",
            messages = self.messages.len(),
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() {
            return;
        }

        let total = content_height(self.messages, area.width, self.typing.is_some(), self.offset);
        let scroll = self.scroll_from_bottom.min(self.max_scroll(area));
        // Row of the transcript shown at the top of the viewport, in content
        // coordinates. Short transcripts are anchored to the bottom.
        let first_row = i32::from(total) - i32::from(area.height) - i32::from(scroll);
        let mut top = i32::from(area.y) - first_row;

        for message in self.messages {
            let layout = layout_bubble(message, area.width, self.offset);
            if top < i32::from(area.bottom()) && top + i32::from(layout.height()) > i32::from(area.y)
            {
                self.draw_bubble(frame, area, message, &layout, top);
            }
            top += i32::from(layout.height() + MESSAGE_GAP);
        }

        if let Some(indicator) = &self.typing {
            let height = TypingIndicator::HEIGHT;
            if top >= i32::from(area.y) && top + i32::from(height) <= i32::from(area.bottom()) {
                indicator.render(Rect::new(area.x, top as u16, area.width, height), frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64, author: Author, text: &str) -> ChatMessage {
        ChatMessage {
            id,
            text: text.to_string(),
            author,
            timestamp: OffsetDateTime::from_unix_timestamp(9 * 3600 + 5 * 60)
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn clock_label_uses_offset() {
        let m = msg(1, Author::User, "hi");
        assert_eq!(m.clock_label(UtcOffset::UTC), "09:05");
        let plus_two = UtcOffset::from_hms(2, 0, 0).expect("valid offset");
        assert_eq!(m.clock_label(plus_two), "11:05");
    }

    #[test]
    fn bubbles_stay_within_eighty_percent() {
        let long = "word ".repeat(40);
        let layout = layout_bubble(&msg(1, Author::User, &long), 50, UtcOffset::UTC);
        assert!(layout.width <= 40);
        assert!(layout.lines.len() > 1);
        for line in &layout.lines {
            assert!(display_width(line) as u16 <= layout.width - 2);
        }
    }

    #[test]
    fn user_right_persona_left() {
        let messages = vec![
            msg(1, Author::Persona, "hello"),
            msg(2, Author::User, "hey"),
        ];
        let mut frame = Frame::new(40, 10);
        MessageList::new(&messages).render(Rect::new(0, 0, 40, 10), &mut frame);
        let text = frame.buffer.text();
        let rows: Vec<&str> = text.lines().collect();

        let persona_row = rows.iter().find(|r| r.contains("hello")).expect("persona row");
        assert!(persona_row.starts_with(PERSONA_AVATAR));
        let user_row = rows.iter().find(|r| r.contains("hey")).expect("user row");
        assert!(user_row.trim_end().ends_with("hey"));
        assert!(user_row.find("hey") > Some(20));
    }

    #[test]
    fn short_transcript_is_anchored_to_bottom() {
        let messages = vec![msg(1, Author::User, "only")];
        let mut frame = Frame::new(30, 8);
        MessageList::new(&messages).render(Rect::new(0, 0, 30, 8), &mut frame);
        // Bubble = text row + time row, ending on the last line.
        assert!(frame.buffer.row_text(6).contains("only"));
        assert!(frame.buffer.row_text(7).contains("09:05"));
    }

    #[test]
    fn scrolling_reveals_older_messages() {
        let messages: Vec<ChatMessage> = (0..10)
            .map(|i| msg(i, Author::User, &format!("message {i}")))
            .collect();
        let area = Rect::new(0, 0, 30, 6);

        let mut bottom = Frame::new(30, 6);
        MessageList::new(&messages).render(area, &mut bottom);
        assert!(bottom.buffer.text().contains("message 9"));
        assert!(!bottom.buffer.text().contains("message 0"));

        let list = MessageList::new(&messages).scroll_from_bottom(u16::MAX);
        let mut top = Frame::new(30, 6);
        list.render(area, &mut top);
        assert!(top.buffer.text().contains("message 0"));
        assert!(!top.buffer.text().contains("message 9"));
    }

    #[test]
    fn max_scroll_matches_content() {
        let messages: Vec<ChatMessage> =
            (0..3).map(|i| msg(i, Author::User, "x")).collect();
        // 3 bubbles * 2 rows + 2 gaps = 8 rows.
        assert_eq!(content_height(&messages, 30, false, UtcOffset::UTC), 8);
        let list = MessageList::new(&messages);
        assert_eq!(list.max_scroll(Rect::new(0, 0, 30, 5)), 3);
        assert_eq!(list.max_scroll(Rect::new(0, 0, 30, 20)), 0);
    }

    #[test]
    fn typing_indicator_sits_below_last_message() {
        let messages = vec![msg(1, Author::User, "ping")];
        let mut frame = Frame::new(30, 10);
        MessageList::new(&messages)
            .typing(Some(TypingIndicator::new(1.0)))
            .render(Rect::new(0, 0, 30, 10), &mut frame);
        let last = frame.buffer.row_text(9);
        assert!(last.contains('●'));
        assert!(frame.buffer.text().contains("ping"));
    }
}
