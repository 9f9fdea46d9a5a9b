//! Format names accepted on the command line

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Direction, JsqError};

/// Decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Whole-document JSON
    Json,
    /// One JSON value per line
    Ndjson,
    /// Raw text lines
    Lines,
    /// Comma separated values with a header row
    Csv,
    /// Whole-document YAML
    Yaml,
}

impl InputFormat {
    /// Infer a decoder from a file extension (`data.jsonl` → ndjson).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(InputFormat::Json),
            "jsonl" | "ndjson" => Some(InputFormat::Ndjson),
            "txt" => Some(InputFormat::Lines),
            "csv" => Some(InputFormat::Csv),
            "yaml" | "yml" => Some(InputFormat::Yaml),
            _ => None,
        }
    }
}

impl FromStr for InputFormat {
    type Err = JsqError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "json" => Ok(InputFormat::Json),
            "ndjson" | "jsonl" => Ok(InputFormat::Ndjson),
            "lines" => Ok(InputFormat::Lines),
            "csv" => Ok(InputFormat::Csv),
            "yaml" | "yml" => Ok(InputFormat::Yaml),
            _ => Err(JsqError::UnknownFormat {
                name: name.to_string(),
                direction: Direction::Input,
            }),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputFormat::Json => "json",
            InputFormat::Ndjson => "ndjson",
            InputFormat::Lines => "lines",
            InputFormat::Csv => "csv",
            InputFormat::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Strings verbatim, everything else as indented JSON
    #[default]
    Raw,
    /// Compact JSON
    Json,
    /// Block-style YAML
    Yaml,
    /// Structural debug dump
    Inspect,
    /// Comma separated values
    Csv,
    /// Box-drawn grid
    Table,
}

impl OutputFormat {
    /// Formats that need the whole sequence before emitting anything.
    pub fn requires_buffering(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Table)
    }
}

impl FromStr for OutputFormat {
    type Err = JsqError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "raw" => Ok(OutputFormat::Raw),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "inspect" => Ok(OutputFormat::Inspect),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            _ => Err(JsqError::UnknownFormat {
                name: name.to_string(),
                direction: Direction::Output,
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Raw => "raw",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Inspect => "inspect",
            OutputFormat::Csv => "csv",
            OutputFormat::Table => "table",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!("jsonl".parse::<InputFormat>().unwrap(), InputFormat::Ndjson);
        assert_eq!("yml".parse::<InputFormat>().unwrap(), InputFormat::Yaml);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
    }

    #[test]
    fn unknown_names_report_direction() {
        match "xml".parse::<InputFormat>() {
            Err(JsqError::UnknownFormat { name, direction }) => {
                assert_eq!(name, "xml");
                assert_eq!(direction, Direction::Input);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            "pretty".parse::<OutputFormat>(),
            Err(JsqError::UnknownFormat {
                direction: Direction::Output,
                ..
            })
        ));
    }

    #[test]
    fn extension_detection() {
        assert_eq!(
            InputFormat::from_extension(Path::new("logs/app.JSONL")),
            Some(InputFormat::Ndjson)
        );
        assert_eq!(
            InputFormat::from_extension(Path::new("notes.txt")),
            Some(InputFormat::Lines)
        );
        assert_eq!(InputFormat::from_extension(Path::new("data")), None);
        assert_eq!(InputFormat::from_extension(Path::new("data.bin")), None);
    }
}
