//! Tree-walking evaluator: executes a `Program` already accepted by
//! `pasc-sem`, maintaining a call stack of activation records and a
//! global variable store.

mod activation;
mod error;
mod evaluator;
mod value;

pub use activation::ActivationRecord;
pub use error::{Result, RuntimeError};
pub use evaluator::Evaluator;
pub use value::Value;
