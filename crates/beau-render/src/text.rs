#![forbid(unsafe_code)]

//! Text measurement and wrapping in terminal columns.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal columns.
#[inline]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Display width of one grapheme cluster.
#[inline]
pub fn grapheme_width(grapheme: &str) -> usize {
    UnicodeWidthStr::width(grapheme)
}

/// Truncate `text` to at most `max_width` columns, ending with `…` when cut.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let limit = max_width - 1;
    let mut out = String::new();
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme_width(grapheme);
        if width + w > limit {
            break;
        }
        out.push_str(grapheme);
        width += w;
    }
    out.push('\u{2026}');
    out
}

/// Word-wrap `text` into lines no wider than `width` columns.
///
/// Explicit newlines are kept as line breaks. Words wider than `width` are
/// split at grapheme boundaries. Whitespace at wrap points is dropped.
/// A `width` of zero yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, width: usize, lines: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_width = 0;
    let mut continuation = false;

    for word in paragraph.split_word_bounds() {
        let word_width = display_width(word);
        let is_space = word.chars().all(char::is_whitespace);

        // Leading whitespace on a wrapped line is dropped.
        if is_space && continuation && line.is_empty() {
            continue;
        }

        if line_width + word_width <= width {
            line.push_str(word);
            line_width += word_width;
            continue;
        }

        if is_space {
            lines.push(line.trim_end().to_string());
            line.clear();
            line_width = 0;
            continuation = true;
            continue;
        }

        if !line.is_empty() {
            lines.push(line.trim_end().to_string());
            line.clear();
            line_width = 0;
            continuation = true;
        }

        if word_width <= width {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        for grapheme in word.graphemes(true) {
            let w = grapheme_width(grapheme);
            if line_width + w > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
                continuation = true;
            }
            line.push_str(grapheme);
            line_width += w;
        }
    }

    lines.push(line.trim_end().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("💙"), 2);
        assert_eq!(grapheme_width("a"), 1);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
        assert_eq!(truncate_with_ellipsis("hello", 4), "hel\u{2026}");
        assert_eq!(truncate_with_ellipsis("hello", 0), "");
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(
            wrap("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_explicit_newlines() {
        assert_eq!(wrap("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn wrap_zero_width_is_empty() {
        assert!(wrap("anything", 0).is_empty());
    }

    #[test]
    fn wrap_empty_text_is_one_empty_line() {
        assert_eq!(wrap("", 5), vec![""]);
    }

    #[test]
    fn wrapped_lines_fit() {
        let text = "Hi! I'm Beau, your relationship coach. I'm here to help you navigate your relationships with wisdom and empathy. What's on your mind today? 💚";
        for width in 3..40 {
            for line in wrap(text, width) {
                assert!(display_width(&line) <= width, "{line:?} wider than {width}");
            }
        }
    }
}
