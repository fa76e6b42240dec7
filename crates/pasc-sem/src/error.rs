use pasc_util::{LocatedError, Span};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemError {
    #[error("Duplicate identifier '{name}' found")]
    DuplicateIdentifier { name: String, span: Span },

    #[error("Undeclared variable '{name}'")]
    UndeclaredVariable { name: String, span: Span },

    #[error("Cannot assign to undeclared variable '{name}'")]
    AssignToUndeclaredVariable { name: String, span: Span },

    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String, span: Span },

    #[error("'{name}' expects {expected} parameter(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Unknown type '{name}'")]
    UnknownType { name: String, span: Span },
}

impl LocatedError for SemError {
    fn span(&self) -> Option<Span> {
        Some(match self {
            SemError::DuplicateIdentifier { span, .. } => *span,
            SemError::UndeclaredVariable { span, .. } => *span,
            SemError::AssignToUndeclaredVariable { span, .. } => *span,
            SemError::UndefinedFunction { span, .. } => *span,
            SemError::ArityMismatch { span, .. } => *span,
            SemError::UnknownType { span, .. } => *span,
        })
    }

    fn kind_label(&self) -> &'static str {
        "SemanticError"
    }
}

pub type Result<T> = std::result::Result<T, SemError>;
