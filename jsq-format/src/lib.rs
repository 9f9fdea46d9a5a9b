//! jsq format - value model and rendering primitives
//!
//! This crate holds everything about data shapes and encodings that does not
//! touch the expression engine or the process I/O:
//!
//! - Error taxonomy shared by all jsq crates
//! - Input source model (materialized, streamed, resolved)
//! - Input and output format names
//! - The recursive rendering engine

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod formats;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use error::{CompileError, Direction, JsqError, Result};
pub use formats::{InputFormat, OutputFormat};
pub use render::{render, RenderOptions};
pub use serde_json::Value;
pub use source::{InputSource, ValueStream};
