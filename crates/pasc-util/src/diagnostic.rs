//! Structured diagnostics with source-snippet rendering.
//!
//! The interpreter core never prints directly; it builds [`Diagnostic`]
//! values that a [`Handler`] collects, and a caller (the CLI, a test) decides
//! how to present them. In normal operation exactly one error-level
//! diagnostic is emitted before interpretation aborts (spec: no error
//! recovery), but `Handler` can hold more than one so a REPL can, in
//! principle, surface accumulated warnings later.

use std::cell::RefCell;
use std::fmt;

use crate::span::Span;

/// Severity of a diagnostic. Only `Error` is produced by the four error
/// kinds the interpreter raises; the others exist so the type is not
/// over-fitted to today's single use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
            Level::Help => "help",
        };
        write!(f, "{s}")
    }
}

/// A single excerpt of source text to show alongside a diagnostic, with an
/// optional caret-underline label.
#[derive(Clone, Debug)]
pub struct SourceSnippet {
    pub line: String,
    pub line_number: u32,
    pub start_column: u32,
    pub end_column: u32,
    pub label: Option<String>,
}

impl SourceSnippet {
    pub fn new(line: impl Into<String>, line_number: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column,
            end_column,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Render the source line plus a caret-underline pointing at the span.
    pub fn format(&self) -> String {
        let gutter = format!("{:>4} | ", self.line_number);
        let pad = " ".repeat(gutter.len() + (self.start_column.saturating_sub(1)) as usize);
        let width = self
            .end_column
            .saturating_sub(self.start_column)
            .max(1) as usize;
        let underline = "^".repeat(width);
        let mut out = format!("{gutter}{}\n{pad}{underline}", self.line);
        if let Some(label) = &self.label {
            out.push(' ');
            out.push_str(label);
        }
        out
    }
}

/// A fully-formed diagnostic: a message, where it occurred, and any
/// supporting notes/snippets.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Option<Span>,
    pub notes: Vec<String>,
    pub snippets: Vec<SourceSnippet>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            span: None,
            notes: Vec::new(),
            snippets: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippets.push(snippet);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) if span.line > 0 && span.column > 0 => write!(
                f,
                "{} at line {}, column {}: {}",
                self.level, span.line, span.column, self.message
            ),
            Some(span) if span.line > 0 => {
                write!(f, "{} at line {}: {}", self.level, span.line, self.message)
            }
            _ => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// Collects diagnostics emitted while lexing, parsing, analyzing, or
/// evaluating. Each pipeline stage is given a `Handler` rather than printing
/// directly.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_column() {
        let d = Diagnostic::error("Division by zero.").with_span(Span::new(0, 0, 4, 9));
        assert_eq!(
            d.to_string(),
            "error at line 4, column 9: Division by zero."
        );
    }

    #[test]
    fn display_without_span() {
        let d = Diagnostic::error("boom");
        assert_eq!(d.to_string(), "error: boom");
    }

    #[test]
    fn handler_tracks_error_count() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        handler.emit(Diagnostic::error("bad"));
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn handler_clear_resets() {
        let handler = Handler::new();
        handler.emit(Diagnostic::error("bad"));
        handler.clear();
        assert!(!handler.has_errors());
    }

    #[test]
    fn snippet_formats_caret_underline() {
        let snippet = SourceSnippet::new("a := 1 / 0", 3, 10, 11).with_label("division by zero");
        let rendered = snippet.format();
        assert!(rendered.contains("a := 1 / 0"));
        assert!(rendered.contains('^'));
        assert!(rendered.contains("division by zero"));
    }
}
