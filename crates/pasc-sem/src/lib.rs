//! Single-pass semantic analysis over the AST produced by `pasc-par`:
//! scope-tree construction, name resolution, and the duplicate/undeclared/
//! arity checks described in the evaluator's contract.

mod analyzer;
mod error;
mod scope;
mod symbol;

pub use analyzer::SemanticAnalyzer;
pub use error::{Result, SemError};
pub use scope::{ScopeId, ScopeTree};
pub use symbol::{BuiltinType, FuncSymbol, Symbol, VarSymbol};
