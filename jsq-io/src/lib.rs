//! jsq I/O - decoding, evaluation and printing
//!
//! This crate connects the value model to the outside world:
//!
//! - Input decoders for JSON, NDJSON, text lines, CSV and YAML
//! - The evaluation driver (`--as`, `--take`, `--to`)
//! - The streaming printer
//! - A high-level [`execute`] entry point used by the CLI

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod driver;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use driver::{parse_take, EvalOptions, Shape};
pub use jsq_expr::Program;
pub use jsq_format::{InputFormat, JsqError, OutputFormat, RenderOptions, Result};
pub use reader::{decode, InputOptions};
pub use writer::print;

use std::io::{Read, Write};
use std::rc::Rc;

/// Everything needed to process one input after the program is compiled.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    /// Decoder for the input
    pub input_format: InputFormat,
    /// Decoder options
    pub input_options: InputOptions,
    /// Shape and truncation settings
    pub eval: EvalOptions,
    /// Renderer for the result
    pub output_format: OutputFormat,
    /// Renderer options
    pub render: RenderOptions,
}

impl Default for ExecuteRequest {
    fn default() -> Self {
        Self {
            input_format: InputFormat::Json,
            input_options: InputOptions::default(),
            eval: EvalOptions::default(),
            output_format: OutputFormat::Raw,
            render: RenderOptions::default(),
        }
    }
}

/// Decode `input`, evaluate `program` over it and print the result.
pub fn execute<R, W>(
    program: Rc<Program>,
    input: R,
    output: &mut W,
    request: &ExecuteRequest,
) -> Result<()>
where
    R: Read + 'static,
    W: Write + ?Sized,
{
    let source = decode(input, request.input_format, &request.input_options)?;
    let result = driver::run(source, program, &request.eval)?;
    print(result, request.output_format, &request.render, output)
}
