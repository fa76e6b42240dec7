//! Foundation types shared across the interpreter pipeline: source spans
//! and the diagnostic/error-formatting machinery every other `pasc-*`
//! crate builds on.
//!
//! Nothing here is a process-global. Every type is owned by whoever
//! constructs it (a `Lexer`, a `SemanticAnalyzer`, an `Evaluator`), so two
//! interpreter instances never see each other's state.

pub mod diagnostic;
pub mod error;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level, SourceSnippet};
pub use error::{format_located, LocatedError};
pub use span::{FileId, Span};

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
