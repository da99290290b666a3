#![forbid(unsafe_code)]

//! Property tests for fault classification and the fallback stack preview.

use beau_core::geometry::Rect;
use beau_render::frame::Frame;
use beau_widgets::error_boundary::{GENERIC_MESSAGE, MAX_STACK_LINES};
use beau_widgets::{
    BoundaryState, ErrorBoundary, Fault, MemorySink, StatefulWidget, Suggestion, Widget, classify,
};
use proptest::prelude::*;

const NEEDLES: [&str; 3] = ["NativeModule", "Cannot read", "undefined"];

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,8}",
        Just("NativeModule".to_string()),
        Just("Cannot read".to_string()),
        Just("undefined".to_string()),
    ]
}

fn message() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..5).prop_map(|parts| parts.concat())
}

struct Raise(Fault);

impl Widget for Raise {
    fn render(&self, _area: Rect, _frame: &mut Frame) {
        self.0.clone().raise();
    }
}

proptest! {
    #[test]
    fn classification_is_first_match_in_rule_order(msg in message()) {
        let expected = NEEDLES
            .iter()
            .zip([
                Suggestion::NativeModule,
                Suggestion::PropertyAccess,
                Suggestion::UndefinedVariable,
            ])
            .find(|(needle, _)| msg.contains(*needle))
            .map(|(_, s)| s);
        prop_assert_eq!(classify(&msg), expected);
    }

    #[test]
    fn classification_is_deterministic(msg in ".{0,40}") {
        prop_assert_eq!(classify(&msg), classify(&msg));
    }

    #[test]
    fn stack_preview_is_bounded_prefix(lines in prop::collection::vec("[a-z:0-9 ]{0,12}", 0..12)) {
        let stack = lines.join("\n");
        let fault = Fault::new("x").with_stack(stack.clone());
        let preview: Vec<&str> = fault.stack_preview().collect();
        let all: Vec<&str> = stack.lines().collect();
        prop_assert!(preview.len() <= MAX_STACK_LINES);
        prop_assert_eq!(preview.len(), all.len().min(MAX_STACK_LINES));
        prop_assert_eq!(&preview[..], &all[..preview.len()]);
    }

    #[test]
    fn fallback_shows_message_or_generic(msg in "[a-zA-Z]{0,20}") {
        let mut frame = Frame::new(60, 16);
        let mut state = BoundaryState::default();
        ErrorBoundary::new(Raise(Fault::new(msg.clone())))
            .sink(MemorySink::new())
            .render(Rect::new(0, 0, 60, 16), &mut frame, &mut state);
        let text = frame.buffer.text();
        if msg.is_empty() {
            prop_assert!(text.contains(GENERIC_MESSAGE));
        } else {
            prop_assert!(text.contains(&msg));
            prop_assert!(!text.contains(GENERIC_MESSAGE));
        }
        prop_assert_eq!(
            state.error().map(|e| e.display_message().to_string()),
            Some(if msg.is_empty() { GENERIC_MESSAGE.to_string() } else { msg })
        );
    }
}
