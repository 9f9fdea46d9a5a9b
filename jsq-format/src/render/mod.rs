//! Rendering engine: values to text in every output format.
//!
//! `render` is recursive: the tabular formats render each cell through
//! `render` again using [`RenderOptions::inner_format`], so nested objects
//! inside a table or CSV cell get the full treatment of whichever format
//! is configured for cells.

mod colorize;
mod csv;
mod inspect;
mod table;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{JsqError, Result};
use crate::formats::OutputFormat;

pub use colorize::to_json;
pub use inspect::inspect;

/// Options shared by every renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indentation width for raw dumps (0 = compact). YAML
    /// always nests by two spaces.
    pub indent: usize,
    /// Separator written after each streamed item
    pub delimiter: String,
    /// Format used for csv/table cells
    pub inner_format: OutputFormat,
    /// Emit ANSI colours
    pub color: bool,
    /// Write a csv header row when rows are objects
    pub csv_headers: bool,
    /// Csv field separator
    pub csv_delimiter: u8,
    /// Line width before `inspect` wraps a container
    pub break_length: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            delimiter: "\n".to_string(),
            inner_format: OutputFormat::Raw,
            color: false,
            csv_headers: true,
            csv_delimiter: b',',
            break_length: 80,
        }
    }
}

/// Keys accepted in `--output-options`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutputOverrides {
    indent: Option<usize>,
    delim: Option<String>,
    format: Option<String>,
    headers: Option<bool>,
    delimiter: Option<char>,
    break_length: Option<usize>,
    colors: Option<bool>,
}

impl RenderOptions {
    /// Apply a user-supplied JSON object on top of these options.
    ///
    /// Unknown keys are ignored so options meant for other renderers can be
    /// passed unchanged.
    pub fn apply_overrides(&mut self, options: Value) -> Result<()> {
        if options.is_null() {
            return Ok(());
        }
        let overrides: OutputOverrides = serde_json::from_value(options)
            .map_err(|err| JsqError::InvalidArgument(format!("output options: {err}")))?;

        if let Some(indent) = overrides.indent {
            self.indent = indent;
        }
        if let Some(delim) = overrides.delim {
            self.delimiter = delim;
        }
        if let Some(format) = overrides.format {
            self.inner_format = format.parse()?;
        }
        if let Some(headers) = overrides.headers {
            self.csv_headers = headers;
        }
        if let Some(delimiter) = overrides.delimiter {
            if !delimiter.is_ascii() {
                return Err(JsqError::InvalidArgument(format!(
                    "csv delimiter must be a single ASCII character, got {delimiter:?}"
                )));
            }
            self.csv_delimiter = delimiter as u8;
        }
        if let Some(width) = overrides.break_length {
            self.break_length = width;
        }
        if let Some(colors) = overrides.colors {
            self.color = colors;
        }
        Ok(())
    }
}

/// Render a single value in `format`.
pub fn render(value: &Value, format: OutputFormat, opts: &RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Raw => Ok(render_raw(value, opts)),
        OutputFormat::Json => Ok(to_json(value, 0, opts.color)),
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(value)?;
            Ok(text.trim_end().to_string())
        }
        OutputFormat::Inspect => Ok(inspect(value, opts)),
        OutputFormat::Csv => csv::render_csv(value, opts),
        OutputFormat::Table => table::render_table(value, opts),
    }
}

fn render_raw(value: &Value, opts: &RenderOptions) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => to_json(other, opts.indent, opts.color),
    }
}

/// Rows for the tabular formats: arrays are rows already, objects become
/// `{key, value}` rows, anything else is not tabular.
fn tabular_rows(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => Some(
            map.iter()
                .map(|(key, value)| {
                    let mut row = serde_json::Map::new();
                    row.insert("key".to_string(), Value::String(key.clone()));
                    row.insert("value".to_string(), value.clone());
                    Value::Object(row)
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Uncoloured single-line text: strings verbatim, null empty, else compact JSON.
fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => to_json(other, 0, false),
    }
}
