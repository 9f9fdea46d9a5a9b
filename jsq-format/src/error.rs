//! Error types for jsq

use std::fmt;

use thiserror::Error;

/// Which side of the pipeline a format name was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Decoder selection (`--input-format`)
    Input,
    /// Renderer selection (`--output-format`, `--inner-format`)
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// A syntax error in a user expression, positioned in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Parser message without position information
    pub message: String,
    /// 1-based line number
    pub line: usize,
    /// 0-based character column within `source_line`
    pub column: usize,
    /// The offending line of the original expression
    pub source_line: String,
}

impl CompileError {
    /// Caret line pointing at `column`, e.g. `-----^`.
    pub fn caret(&self) -> String {
        format!("{}^", "-".repeat(self.column))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax Error: {}\n\n{}\n{}",
            self.message,
            self.source_line,
            self.caret()
        )
    }
}

impl std::error::Error for CompileError {}

/// jsq error types
#[derive(Debug, Error)]
pub enum JsqError {
    /// The expression failed to parse.
    #[error("{0}")]
    Compile(#[from] CompileError),
    /// A format name is not recognized.
    #[error("Unknown {direction} format: {name}")]
    UnknownFormat {
        /// Name as given by the user
        name: String,
        /// Input or output side
        direction: Direction,
    },
    /// A user-supplied argument is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The requested operation cannot apply to the current data shape.
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Input could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The user expression raised an error while running.
    #[error("{0}")]
    Runtime(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML parsing or serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// CSV parsing or serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl JsqError {
    /// True when the failure is a broken pipe on the output sink.
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            JsqError::Io(err) => err.kind() == std::io::ErrorKind::BrokenPipe,
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, JsqError>;
