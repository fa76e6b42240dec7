//! The shared error-reporting contract all four error kinds implement.
//!
//! `LexError`, `ParseError`, `SemError`, and `RuntimeError` each live in
//! their owning crate as a `thiserror`-derived enum whose `Display` is just
//! the bare message (e.g. `"Invalid number format"`). [`LocatedError`] adds
//! the `(line, column)` that message is attached to, and [`format_located`]
//! renders the single line the CLI prints on failure:
//! `"<Kind> at line L, column C: <message>"`.

use std::error::Error;

use crate::span::Span;

/// Implemented by every error kind in the pipeline (`LexError`,
/// `ParseError`, `SemError`, `RuntimeError`) so a caller can format any of
/// them uniformly without matching on which crate raised it.
pub trait LocatedError: Error {
    /// Where the error occurred, if known. `LexError` always knows;
    /// `ParseError`/`SemError`/`RuntimeError` usually do.
    fn span(&self) -> Option<Span>;

    /// The error-kind name as spec'd: `"LexerError"`, `"ParserError"`,
    /// `"SemanticError"`, `"RuntimeError"`.
    fn kind_label(&self) -> &'static str;
}

/// Render `"<Kind> at line L, column C: <message>"`, falling back to
/// line-only or neither when the span doesn't carry both.
pub fn format_located(err: &dyn LocatedError) -> String {
    match err.span() {
        Some(span) if span.line > 0 && span.column > 0 => {
            format!(
                "{} at line {}, column {}: {}",
                err.kind_label(),
                span.line,
                span.column,
                err
            )
        }
        Some(span) if span.line > 0 => {
            format!("{} at line {}: {}", err.kind_label(), span.line, err)
        }
        _ => format!("{}: {}", err.kind_label(), err),
    }
}
