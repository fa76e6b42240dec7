//! Turns Pascal-like source text into a token stream.
//!
//! See [`Lexer`] for the entry point and [`TokenKind`] for the full token
//! set. Errors are reported through [`LexError`], which always carries a
//! source [`pasc_util::Span`].

mod error;
mod lexer;
mod token;

pub use error::{LexError, Result};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
