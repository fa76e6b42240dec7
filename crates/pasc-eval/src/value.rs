//! Runtime values.

use std::fmt;

use pasc_util::Span;

use crate::error::{Result, RuntimeError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Unit,
}

impl Value {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(n as f64),
            Value::Real(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(n),
            Value::Real(n) => Some(n as i64),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Value::Int(_) | Value::Real(_))
    }

    /// FOR loop bounds must be INTEGER; a REAL (or other) bound is a
    /// runtime error rather than an implicit truncation.
    pub fn expect_int(self, span: Span) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(n),
            _ => Err(RuntimeError::ForBoundNotInteger { span }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Real(n) => {
                let s = n.to_string();
                if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
                    write!(f, "{s}")
                } else {
                    write!(f, "{s}.0")
                }
            }
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Unit => write!(f, "Unit"),
        }
    }
}
