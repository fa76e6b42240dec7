use pasc_util::{LocatedError, Span};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Division by zero.")]
    DivisionByZero { span: Span },

    #[error("Variable '{name}' used before assignment")]
    UsedBeforeAssignment { name: String, span: Span },

    #[error("Undefined Function")]
    UndefinedFunction { span: Span },

    #[error("Stack overflow: maximum recursion depth exceeded in '{name}'")]
    StackOverflow { name: String, span: Span },

    #[error("FOR loop bounds must be INTEGER")]
    ForBoundNotInteger { span: Span },
}

impl LocatedError for RuntimeError {
    fn span(&self) -> Option<Span> {
        Some(match self {
            RuntimeError::DivisionByZero { span } => *span,
            RuntimeError::UsedBeforeAssignment { span, .. } => *span,
            RuntimeError::UndefinedFunction { span } => *span,
            RuntimeError::StackOverflow { span, .. } => *span,
            RuntimeError::ForBoundNotInteger { span } => *span,
        })
    }

    fn kind_label(&self) -> &'static str {
        "RuntimeError"
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
