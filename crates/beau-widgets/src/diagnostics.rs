#![forbid(unsafe_code)]

//! Fault diagnostics: sinks, heuristic classification, and the report.
//!
//! When an [`ErrorBoundary`](crate::ErrorBoundary) catches a fault it writes
//! a fixed sequence of lines to a [`DiagnosticSink`]. The text of each line
//! is consumed by external log scrapers and must not change.
//!
//! ```text
//! error  🚨 ErrorBoundary caught an error: {type}: {message}
//! error  🚨 Error info: {component_stack}
//! info   🔍 AUTOMATIC ERROR DETECTED:
//! info   Error Type: {type}
//! info   Error Message: {message}
//! info   Error Stack: {stack}
//! info   Component Stack: {component_stack}
//! info   Timestamp: {RFC 3339, UTC}
//! info   🔧 AUTO-SUGGESTION: {suggestion}      (at most once)
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error_boundary::Fault;

/// Target used for every event emitted by [`TracingSink`].
pub const DIAGNOSTICS_TARGET: &str = "beau::diagnostics";

/// Severity of one diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticLevel {
    Error,
    Info,
}

/// One recorded diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLine {
    pub level: DiagnosticLevel,
    pub text: String,
}

/// Destination for fault diagnostics.
///
/// Implementations must not panic; a boundary reports from inside its own
/// failure handling.
pub trait DiagnosticSink {
    /// Record an error-level line.
    fn error(&self, line: &str);

    /// Record an info-level line.
    fn info(&self, line: &str);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn error(&self, line: &str) {
        (**self).error(line);
    }

    fn info(&self, line: &str) {
        (**self).info(line);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<S> {
    fn error(&self, line: &str) {
        (**self).error(line);
    }

    fn info(&self, line: &str) {
        (**self).info(line);
    }
}

/// Sink that forwards each line as a `tracing` event under
/// [`DIAGNOSTICS_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn error(&self, line: &str) {
        tracing::error!(target: "beau::diagnostics", "{line}");
    }

    fn info(&self, line: &str) {
        tracing::info!(target: "beau::diagnostics", "{line}");
    }
}

/// Sink that keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<DiagnosticLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded lines, in order.
    pub fn lines(&self) -> Vec<DiagnosticLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text of all recorded lines, in order.
    pub fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|line| line.text).collect()
    }

    /// Whether a line with exactly this text was recorded.
    pub fn contains(&self, text: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|line| line.text == text)
    }

    /// Drop all recorded lines.
    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&self, level: DiagnosticLevel, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DiagnosticLine {
                level,
                text: line.to_string(),
            });
    }
}

impl DiagnosticSink for MemorySink {
    fn error(&self, line: &str) {
        self.push(DiagnosticLevel::Error, line);
    }

    fn info(&self, line: &str) {
        self.push(DiagnosticLevel::Info, line);
    }
}

/// A remediation hint derived from a fault message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suggestion {
    /// Message mentions `NativeModule`.
    NativeModule,
    /// Message mentions `Cannot read`.
    PropertyAccess,
    /// Message mentions `undefined`.
    UndefinedVariable,
}

impl Suggestion {
    /// Human-readable hint text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NativeModule => "NativeModule error - check component imports",
            Self::PropertyAccess => "Property access error - add null checks",
            Self::UndefinedVariable => "Undefined variable - check declarations",
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a fault message by substring, first match wins.
///
/// Matching is case-sensitive.
pub fn classify(message: &str) -> Option<Suggestion> {
    const RULES: [(&str, Suggestion); 3] = [
        ("NativeModule", Suggestion::NativeModule),
        ("Cannot read", Suggestion::PropertyAccess),
        ("undefined", Suggestion::UndefinedVariable),
    ];
    RULES
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|&(_, suggestion)| suggestion)
}

/// Write the full diagnostic report for `fault`, timestamped now.
pub fn report_fault(sink: &dyn DiagnosticSink, fault: &Fault, component_stack: &str) {
    report_fault_at(sink, fault, component_stack, OffsetDateTime::now_utc());
}

/// Write the full diagnostic report for `fault` with an explicit timestamp.
pub fn report_fault_at(
    sink: &dyn DiagnosticSink,
    fault: &Fault,
    component_stack: &str,
    at: OffsetDateTime,
) {
    sink.error(&format!(
        "🚨 ErrorBoundary caught an error: {}: {}",
        fault.type_name, fault.message
    ));
    sink.error(&format!("🚨 Error info: {component_stack}"));

    sink.info("🔍 AUTOMATIC ERROR DETECTED:");
    sink.info(&format!("Error Type: {}", fault.type_name));
    sink.info(&format!("Error Message: {}", fault.message));
    sink.info(&format!("Error Stack: {}", fault.stack));
    sink.info(&format!("Component Stack: {component_stack}"));
    sink.info(&format!("Timestamp: {}", rfc3339_utc(at)));

    if let Some(suggestion) = classify(&fault.message) {
        sink.info(&format!("🔧 AUTO-SUGGESTION: {suggestion}"));
    }
}

fn rfc3339_utc(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    utc.format(&Rfc3339)
        .unwrap_or_else(|_| utc.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault(message: &str) -> Fault {
        Fault::new(message).with_stack("at render\nat main")
    }

    #[test]
    fn classification_rules() {
        assert_eq!(classify("NativeModule missing"), Some(Suggestion::NativeModule));
        assert_eq!(
            classify("Cannot read property 'x'"),
            Some(Suggestion::PropertyAccess)
        );
        assert_eq!(classify("foo is undefined"), Some(Suggestion::UndefinedVariable));
        assert_eq!(classify("index out of bounds"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn classification_first_match_wins() {
        assert_eq!(classify("NativeModule undefined"), Some(Suggestion::NativeModule));
        assert_eq!(
            classify("Cannot read property of undefined"),
            Some(Suggestion::PropertyAccess)
        );
    }

    #[test]
    fn classification_is_case_sensitive() {
        assert_eq!(classify("nativemodule"), None);
        assert_eq!(classify("Undefined"), None);
    }

    #[test]
    fn report_lines_in_order() {
        let sink = MemorySink::new();
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
        report_fault_at(&sink, &fault("Test error message"), "    in ChatScreen", at);

        let lines = sink.lines();
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "🚨 ErrorBoundary caught an error: Fault: Test error message",
                "🚨 Error info:     in ChatScreen",
                "🔍 AUTOMATIC ERROR DETECTED:",
                "Error Type: Fault",
                "Error Message: Test error message",
                "Error Stack: at render\nat main",
                "Component Stack:     in ChatScreen",
                "Timestamp: 2023-11-14T22:13:20Z",
            ]
        );
        assert_eq!(lines[0].level, DiagnosticLevel::Error);
        assert_eq!(lines[1].level, DiagnosticLevel::Error);
        assert!(lines[2..].iter().all(|l| l.level == DiagnosticLevel::Info));
    }

    #[test]
    fn report_appends_one_suggestion() {
        let sink = MemorySink::new();
        report_fault(&sink, &fault("NativeModule undefined"), "");
        let suggestions: Vec<String> = sink
            .texts()
            .into_iter()
            .filter(|t| t.starts_with("🔧 AUTO-SUGGESTION: "))
            .collect();
        assert_eq!(
            suggestions,
            vec!["🔧 AUTO-SUGGESTION: NativeModule error - check component imports"]
        );
    }

    #[test]
    fn report_tolerates_empty_fault() {
        let sink = MemorySink::new();
        report_fault(&sink, &Fault::new(""), "");
        assert!(sink.contains("Error Message: "));
        assert!(sink.contains("Error Stack: "));
        assert_eq!(sink.lines().len(), 8);
    }

    #[test]
    fn timestamp_is_normalized_to_utc() {
        let at = OffsetDateTime::from_unix_timestamp(0)
            .expect("valid timestamp")
            .to_offset(time::UtcOffset::from_hms(2, 0, 0).expect("valid offset"));
        assert_eq!(rfc3339_utc(at), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn memory_sink_clear() {
        let sink = MemorySink::new();
        sink.info("x");
        assert!(sink.contains("x"));
        sink.clear();
        assert!(sink.lines().is_empty());
    }
}
