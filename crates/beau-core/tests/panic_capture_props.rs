#![forbid(unsafe_code)]

//! Property tests for render-path bookkeeping across contained panics.

use beau_core::panic_capture::{
    catch_contained, component_stack, install_capture_hook, render_scope,
};
use proptest::prelude::*;

const NAMES: [&str; 5] = ["App", "ErrorBoundary", "ChatScreen", "MessageList", "Bubble"];

fn nested_panic(depth: usize) {
    if depth == 0 {
        panic!("leaf fault");
    }
    let _scope = render_scope(NAMES[depth % NAMES.len()]);
    nested_panic(depth - 1);
}

proptest! {
    #[test]
    fn path_is_restored_after_any_contained_panic(depth in 0usize..12) {
        install_capture_hook();
        let before = component_stack();
        let result = catch_contained(|| nested_panic(depth));
        let (_, capture) = result.unwrap_err();
        let capture = capture.expect("capture recorded");
        prop_assert_eq!(capture.component_stack.lines().count(), depth);
        prop_assert_eq!(component_stack(), before);
    }

    #[test]
    fn innermost_component_is_listed_first(depth in 1usize..12) {
        install_capture_hook();
        let (_, capture) = catch_contained(|| nested_panic(depth)).unwrap_err();
        let capture = capture.expect("capture recorded");
        let first = capture.component_stack.lines().next().unwrap_or_default().to_string();
        prop_assert_eq!(first, format!("    in {}", NAMES[1 % NAMES.len()]));
    }
}
