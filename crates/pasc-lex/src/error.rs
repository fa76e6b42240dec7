use pasc_util::{LocatedError, Span};
use thiserror::Error;

/// Errors the lexer can raise. Every variant carries a [`Span`] — unlike
/// the other three error kinds, a `LexError` always knows where it
/// happened, since the lexer is the thing tracking `(line, column)` in the
/// first place.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("Invalid number format")]
    InvalidNumberFormat { span: Span },

    #[error("Unterminated comment")]
    UnterminatedComment { span: Span },

    #[error("Invalid character '{ch}'")]
    InvalidCharacter { ch: char, span: Span },
}

impl LocatedError for LexError {
    fn span(&self) -> Option<Span> {
        Some(match self {
            LexError::InvalidNumberFormat { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidCharacter { span, .. } => *span,
        })
    }

    fn kind_label(&self) -> &'static str {
        "LexerError"
    }
}

pub type Result<T> = std::result::Result<T, LexError>;
