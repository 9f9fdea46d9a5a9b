//! jsq expr - compiling and running user expressions
//!
//! Expressions are written in Rhai with three aliases layered on top:
//!
//! - `$` is the current value
//! - `$$` is the current value wrapped for method chaining
//! - `_` is the utility namespace, `fp` its curried data-last twin
//!
//! Keys of the current value (when it is an object) are also visible as
//! bare identifiers.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod compiler;
pub mod convert;
pub mod library;
pub mod program;

pub use compiler::{normalize_expression, rewrite, Rewritten};
pub use program::{Outcome, Program};
