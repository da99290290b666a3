#![forbid(unsafe_code)]

//! Message composer input.
//!
//! A single-line text field with a grapheme-aware cursor, placeholder text,
//! paste support and a length cap counted in grapheme clusters.

use beau_core::event::{Event, KeyCode, KeyEvent};
use beau_core::geometry::Rect;
use beau_render::cell::StyleFlags;
use beau_render::frame::Frame;
use beau_render::style::Style;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::{Widget, draw_text_span, set_style_area};

/// A single-line text input widget.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    /// Text value.
    value: String,
    /// Cursor position (grapheme index).
    cursor: usize,
    placeholder: String,
    /// Maximum length in graphemes (None = unlimited).
    max_length: Option<usize>,
    style: Style,
    placeholder_style: Style,
    /// Whether the input is focused (controls cursor output).
    focused: bool,
}

impl TextInput {
    /// Create a new empty text input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder text (builder).
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set maximum length in graphemes (builder).
    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Set base style (builder).
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Set placeholder style (builder).
    #[must_use]
    pub fn with_placeholder_style(mut self, style: Style) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Set whether the input is focused (builder).
    #[must_use]
    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Get the current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, truncated to the length cap; cursor moves to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value.clear();
        self.cursor = 0;
        self.insert_str(&value.into());
    }

    /// Clear all text.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Get the cursor position (grapheme index).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of grapheme clusters in the value.
    pub fn len(&self) -> usize {
        self.value.graphemes(true).count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Handle a terminal event.
    ///
    /// Returns `true` if the event was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) if key.is_press() => self.handle_key(key),
            Event::Paste(text) => {
                // Single line: newlines become spaces.
                let flat: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.insert_str(&flat);
                true
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.ctrl() && !key.alt() => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                true
            }
            KeyCode::Backspace => {
                self.delete_back();
                true
            }
            KeyCode::Delete => {
                self.delete_forward();
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.len();
                true
            }
            _ => false,
        }
    }

    /// Insert `text` at the cursor, keeping only as many graphemes as the
    /// length cap allows.
    pub fn insert_str(&mut self, text: &str) {
        let room = self
            .max_length
            .map_or(usize::MAX, |max| max.saturating_sub(self.len()));
        let accepted: String = text.graphemes(true).take(room).collect();
        if accepted.is_empty() {
            return;
        }

        let before = self.len();
        let byte_offset = self.grapheme_byte_offset(self.cursor);
        self.value.insert_str(byte_offset, &accepted);
        // Clusters can merge with their neighbours, so count the change.
        let added = self.len().saturating_sub(before);
        self.cursor += added;

        if let Some(max) = self.max_length
            && self.len() > max
        {
            let end = self.grapheme_byte_offset(max);
            self.value.truncate(end);
            self.cursor = self.cursor.min(max);
        }
    }

    fn delete_back(&mut self) {
        if self.cursor > 0 {
            let start = self.grapheme_byte_offset(self.cursor - 1);
            let end = self.grapheme_byte_offset(self.cursor);
            self.value.drain(start..end);
            self.cursor -= 1;
        }
    }

    fn delete_forward(&mut self) {
        if self.cursor < self.len() {
            let start = self.grapheme_byte_offset(self.cursor);
            let end = self.grapheme_byte_offset(self.cursor + 1);
            self.value.drain(start..end);
        }
    }

    fn grapheme_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn cursor_visual_pos(&self) -> usize {
        self.value
            .graphemes(true)
            .take(self.cursor)
            .map(UnicodeWidthStr::width)
            .sum()
    }

    /// Columns scrolled off the left edge so the cursor stays visible.
    fn scroll_for(&self, viewport_width: usize) -> usize {
        (self.cursor_visual_pos() + 1).saturating_sub(viewport_width)
    }

    /// Cursor screen position within `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let rel = self.cursor_visual_pos() - self.scroll_for(area.width as usize);
        let x = area
            .x
            .saturating_add(rel as u16)
            .min(area.right().saturating_sub(1));
        (x, area.y)
    }
}

impl Widget for TextInput {
    fn render(&self, area: Rect, frame: &mut Frame) {
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "TextInput",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height
        )
        .entered();

        if area.is_empty() {
            return;
        }
        set_style_area(frame, area, self.style);

        if self.value.is_empty() {
            draw_text_span(
                frame,
                area.x,
                area.y,
                &self.placeholder,
                self.placeholder_style,
                area.right(),
            );
        } else {
            let scroll = self.scroll_for(area.width as usize);
            let mut visual = 0;
            let mut x = area.x;
            for g in self.value.graphemes(true) {
                let w = UnicodeWidthStr::width(g);
                if visual < scroll {
                    visual += w;
                    continue;
                }
                x = draw_text_span(frame, x, area.y, g, self.style, area.right());
                if x >= area.right() {
                    break;
                }
            }
        }

        if self.focused {
            let (cx, cy) = self.cursor_position(area);
            if let Some(cell) = frame.buffer.get_mut(cx, cy) {
                cell.attrs ^= StyleFlags::REVERSE;
            }
            frame.set_cursor(Some((cx, cy)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beau_core::event::Modifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code))
    }

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::new();
        for c in text.chars() {
            input.handle_event(&key(KeyCode::Char(c)));
        }
        input
    }

    #[test]
    fn typing_appends() {
        let input = typed("hello");
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn insert_mid_text() {
        let mut input = typed("hllo");
        input.handle_event(&key(KeyCode::Home));
        input.handle_event(&key(KeyCode::Right));
        input.handle_event(&key(KeyCode::Char('e')));
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete() {
        let mut input = typed("abc");
        input.handle_event(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "ab");
        input.handle_event(&key(KeyCode::Home));
        input.handle_event(&key(KeyCode::Delete));
        assert_eq!(input.value(), "b");
        input.handle_event(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn cursor_is_clamped() {
        let mut input = typed("ab");
        input.handle_event(&key(KeyCode::Right));
        assert_eq!(input.cursor(), 2);
        input.handle_event(&key(KeyCode::Home));
        input.handle_event(&key(KeyCode::Left));
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn ctrl_chars_are_not_inserted() {
        let mut input = TextInput::new();
        let consumed = input.handle_event(&Event::Key(
            KeyEvent::new(KeyCode::Char('b')).with_modifiers(Modifiers::CTRL),
        ));
        assert!(!consumed);
        assert!(input.is_empty());
    }

    #[test]
    fn max_length_caps_typing() {
        let mut input = TextInput::new().with_max_length(3);
        for c in "abcdef".chars() {
            input.handle_event(&key(KeyCode::Char(c)));
        }
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn paste_is_truncated_and_flattened() {
        let mut input = TextInput::new().with_max_length(5);
        input.handle_event(&Event::Paste("ab\ncdefgh".into()));
        assert_eq!(input.value(), "ab cd");
        assert_eq!(input.cursor(), 5);
    }

    #[test]
    fn graphemes_count_once() {
        let mut input = TextInput::new().with_max_length(2);
        input.handle_event(&Event::Paste("e\u{301}💙x".into()));
        assert_eq!(input.len(), 2);
        assert_eq!(input.value(), "e\u{301}💙");
        input.handle_event(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "e\u{301}");
    }

    #[test]
    fn set_value_moves_cursor_to_end() {
        let mut input = TextInput::new();
        input.set_value("hey");
        assert_eq!(input.cursor(), 3);
        input.clear();
        assert_eq!((input.value(), input.cursor()), ("", 0));
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let input = TextInput::new().with_placeholder("Type a message...");
        let mut frame = Frame::new(20, 1);
        input.render(Rect::new(0, 0, 20, 1), &mut frame);
        assert!(frame.buffer.row_text(0).starts_with("Type a message..."));
    }

    #[test]
    fn render_scrolls_to_keep_cursor_visible() {
        let input = typed("abcdefghij").with_focused(true);
        let mut frame = Frame::new(5, 1);
        let area = Rect::new(0, 0, 5, 1);
        input.render(area, &mut frame);
        assert_eq!(frame.buffer.row_text(0), "ghij ");
        assert_eq!(frame.cursor_position, Some((4, 0)));
    }

    #[test]
    fn unfocused_render_leaves_cursor_unset() {
        let input = typed("abc");
        let mut frame = Frame::new(5, 1);
        input.render(Rect::new(0, 0, 5, 1), &mut frame);
        assert_eq!(frame.cursor_position, None);
    }
}
