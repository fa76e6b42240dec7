use pasc_lex::TokenKind;
use pasc_util::{LocatedError, Span};
use thiserror::Error;

/// Errors the parser can raise. There is no recovery: the first error
/// aborts parsing and is propagated with `?`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        span: Span,
    },

    #[error("unexpected {found} in statement list")]
    UnexpectedInStatementList { found: TokenKind, span: Span },

    #[error("expected a statement, found {found}")]
    ExpectedStatement { found: TokenKind, span: Span },

    #[error("expected a type (INTEGER or REAL), found {found}")]
    ExpectedType { found: TokenKind, span: Span },
}

impl LocatedError for ParseError {
    fn span(&self) -> Option<Span> {
        Some(match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedInStatementList { span, .. } => *span,
            ParseError::ExpectedStatement { span, .. } => *span,
            ParseError::ExpectedType { span, .. } => *span,
        })
    }

    fn kind_label(&self) -> &'static str {
        "ParserError"
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
