#![forbid(unsafe_code)]

//! Render-path tracking and contained panic capture.
//!
//! Panics raised while rendering are caught by error boundaries with
//! [`catch_contained`]. By the time `catch_unwind` returns, the stack has
//! unwound and every [`RenderScope`] guard has been dropped, so the
//! diagnostic context (backtrace and active component path) is snapshotted
//! inside the panic hook instead, while the panicking frames still exist.
//!
//! # Invariants
//!
//! - The render path is per-thread and strictly nested: a scope pops exactly
//!   the entry it pushed, including during unwinding.
//! - A panic raised while at least one containment is active is recorded
//!   and is not forwarded to the previously installed hook.
//! - A panic raised outside any containment is forwarded untouched.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

thread_local! {
    static RENDER_PATH: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    static CONTAINMENT_DEPTH: Cell<u32> = const { Cell::new(0) };
    static LAST_CAPTURE: RefCell<Option<PanicCapture>> = const { RefCell::new(None) };
}

/// Diagnostic context snapshotted at the moment a contained panic was raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanicCapture {
    /// Backtrace text with the panic machinery frames removed.
    pub backtrace: String,
    /// Active components, innermost first, one `    in {name}` line each.
    pub component_stack: String,
    /// `file:line:col` of the panic site, when known.
    pub location: Option<String>,
}

/// Guard for one entry on the current thread's render path.
///
/// Created by [`render_scope`]; pops its entry when dropped.
#[derive(Debug)]
#[must_use = "the scope ends when the guard is dropped"]
pub struct RenderScope {
    depth: usize,
}

impl Drop for RenderScope {
    fn drop(&mut self) {
        RENDER_PATH.with(|path| path.borrow_mut().truncate(self.depth));
    }
}

/// Push `name` onto the current thread's render path for the guard's lifetime.
pub fn render_scope(name: &'static str) -> RenderScope {
    RENDER_PATH.with(|path| {
        let mut path = path.borrow_mut();
        let depth = path.len();
        path.push(name);
        RenderScope { depth }
    })
}

/// Format the current render path, innermost component first.
pub fn component_stack() -> String {
    RENDER_PATH.with(|path| format_component_stack(&path.borrow()))
}

fn format_component_stack(path: &[&'static str]) -> String {
    path.iter()
        .rev()
        .map(|name| format!("    in {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the current thread is inside [`catch_contained`].
pub fn is_contained() -> bool {
    CONTAINMENT_DEPTH.with(Cell::get) > 0
}

/// Install the capture hook once per process, chaining to the previous hook.
///
/// Safe to call repeatedly. Boundaries call this on construction.
pub fn install_capture_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if is_contained() {
                let capture = PanicCapture {
                    backtrace: trim_panic_frames(&Backtrace::force_capture().to_string()),
                    component_stack: component_stack(),
                    location: info
                        .location()
                        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
                };
                LAST_CAPTURE.with(|last| *last.borrow_mut() = Some(capture));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f`, catching any panic it raises.
///
/// On panic, returns the payload together with the capture recorded by the
/// hook (if [`install_capture_hook`] has been called).
pub fn catch_contained<R>(
    f: impl FnOnce() -> R,
) -> Result<R, (Box<dyn Any + Send>, Option<PanicCapture>)> {
    LAST_CAPTURE.with(|last| last.borrow_mut().take());
    CONTAINMENT_DEPTH.with(|d| d.set(d.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINMENT_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    result.map_err(|payload| (payload, LAST_CAPTURE.with(|last| last.borrow_mut().take())))
}

/// Drop the leading frames that belong to the panic runtime itself.
///
/// Frames are blocks starting with an `N: symbol` line. Leading blocks whose
/// symbol lives in `std`, `core`, `alloc`, or this module are skipped. If
/// every block would be skipped the text is returned unchanged.
pub fn trim_panic_frames(backtrace: &str) -> String {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in backtrace.lines() {
        if is_frame_header(line) || blocks.is_empty() {
            blocks.push(vec![line]);
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    let first_user = blocks.iter().position(|block| {
        let symbol = block
            .first()
            .and_then(|l| l.split_once(": "))
            .map_or("", |(_, s)| s.trim());
        !is_runtime_symbol(symbol)
    });

    match first_user {
        Some(start) if start > 0 => blocks[start..]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join("\n"),
        _ => backtrace.trim_end().to_string(),
    }
}

fn is_frame_header(line: &str) -> bool {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with(": ")
}

fn is_runtime_symbol(symbol: &str) -> bool {
    const PREFIXES: [&str; 10] = [
        "std::",
        "core::",
        "alloc::",
        "<std::",
        "<core::",
        "<alloc::",
        "rust_begin_unwind",
        "__rust",
        "beau_core::panic_capture",
        "<beau_core::panic_capture",
    ];
    PREFIXES.iter().any(|p| symbol.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_scope_nests_and_pops() {
        assert_eq!(component_stack(), "");
        let _outer = render_scope("App");
        {
            let _inner = render_scope("ChatScreen");
            assert_eq!(component_stack(), "    in ChatScreen\n    in App");
        }
        assert_eq!(component_stack(), "    in App");
    }

    #[test]
    fn contained_panic_records_path_and_backtrace() {
        install_capture_hook();
        let _root = render_scope("Root");
        let result = catch_contained(|| {
            let _scope = render_scope("Exploder");
            panic!("boom");
        });
        let (payload, capture) = result.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        let capture = capture.expect("hook records contained panics");
        assert_eq!(capture.component_stack, "    in Exploder\n    in Root");
        assert!(capture.location.unwrap().contains("panic_capture.rs"));
        // Scope guards unwound, leaving only the outer entry.
        assert_eq!(component_stack(), "    in Root");
        assert!(!is_contained());
    }

    #[test]
    fn successful_call_passes_value_through() {
        let result = catch_contained(|| 41 + 1);
        assert_eq!(result.ok(), Some(42));
    }

    #[test]
    fn containment_depth_tracks_nesting() {
        assert!(!is_contained());
        let inner = catch_contained(|| catch_contained(is_contained).ok());
        assert_eq!(inner.ok(), Some(Some(true)));
        assert!(!is_contained());
    }

    #[test]
    fn trims_runtime_frames() {
        let bt = "   0: std::backtrace::Backtrace::force_capture\n             at /rustc/std/src/backtrace.rs:1\n   1: core::panicking::panic_fmt\n   2: beau_chat::screens::chat::render\n             at src/screens/chat.rs:10:5\n   3: main";
        let trimmed = trim_panic_frames(bt);
        assert!(trimmed.starts_with("   2: beau_chat::screens::chat::render"));
        assert!(trimmed.ends_with("   3: main"));
    }

    #[test]
    fn all_runtime_frames_are_kept() {
        let bt = "   0: std::rt::lang_start\n   1: core::ops::function::FnOnce::call_once";
        assert_eq!(trim_panic_frames(bt), bt);
    }

    #[test]
    fn empty_backtrace_stays_empty() {
        assert_eq!(trim_panic_frames(""), "");
    }
}
