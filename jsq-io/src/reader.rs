//! Input decoders
//!
//! Whole-document formats (JSON, YAML) are parsed eagerly. Line oriented
//! formats (NDJSON, lines, CSV) are decoded lazily so that `--take` and
//! streaming output never read further than needed.

use std::io::{BufRead, BufReader, Read};

use jsq_format::{InputFormat, InputSource, JsqError, Result, Value, ValueStream};
use serde::Deserialize;
use serde_json::Map;
use tracing::{debug, warn};

/// Decoder options, given on the command line as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputOptions {
    /// Record separator for `lines`, field separator for `csv`
    pub delimiter: Option<String>,
    /// CSV quote character
    pub quote: Option<char>,
    /// Treat the first CSV row as column names
    pub headers: bool,
    /// Trim whitespace around CSV fields
    pub trim: bool,
    /// Allow CSV rows of differing lengths
    pub flexible: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: None,
            headers: true,
            trim: false,
            flexible: false,
        }
    }
}

impl InputOptions {
    /// Build from a JSON object; `null` yields the defaults.
    pub fn from_json(options: Value) -> Result<Self> {
        if options.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(options)
            .map_err(|err| JsqError::InvalidArgument(format!("input options: {err}")))
    }
}

/// Decode `input` into an [`InputSource`].
pub fn decode<R>(input: R, format: InputFormat, options: &InputOptions) -> Result<InputSource>
where
    R: Read + 'static,
{
    debug!(%format, "decoding input");
    match format {
        InputFormat::Json => {
            let value: Value = serde_json::from_reader(BufReader::new(input))?;
            Ok(InputSource::from_document(value))
        }
        InputFormat::Yaml => {
            let value: Value = serde_yaml::from_reader(BufReader::new(input))?;
            Ok(InputSource::from_document(value))
        }
        InputFormat::Ndjson => Ok(InputSource::Streamed(ValueStream::new(NdjsonRecords::new(
            BufReader::new(input),
        )))),
        InputFormat::Lines => {
            let lines = Lines::new(BufReader::new(input), options.delimiter.as_deref())?;
            Ok(InputSource::Streamed(ValueStream::new(lines)))
        }
        InputFormat::Csv => csv_records(input, options).map(InputSource::Streamed),
    }
}

/// One JSON value per line. Blank lines are ignored; malformed lines are
/// logged and skipped.
pub struct NdjsonRecords<R> {
    reader: R,
    line: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> NdjsonRecords<R> {
    /// Read records from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for NdjsonRecords<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }
            self.line_number += 1;

            let record = self.line.trim_ascii();
            if record.is_empty() {
                continue;
            }
            match serde_json::from_slice(record) {
                Ok(value) => return Some(Ok(value)),
                Err(err) => {
                    let record = String::from_utf8_lossy(record);
                    warn!(line = self.line_number, %err, %record, "skipping malformed ndjson record");
                }
            }
        }
    }
}

/// Text split on a delimiter. The default delimiter is a newline, with a
/// trailing carriage return removed from each line.
pub struct Lines<R> {
    reader: R,
    delimiter: Vec<u8>,
    strip_cr: bool,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    /// Split `reader` on `delimiter` (newline when `None`).
    pub fn new(reader: R, delimiter: Option<&str>) -> Result<Self> {
        let (delimiter, strip_cr) = match delimiter {
            None | Some("\n") => (b"\n".to_vec(), true),
            Some("") => {
                return Err(JsqError::InvalidArgument(
                    "lines delimiter must not be empty".to_string(),
                ))
            }
            Some(other) => (other.as_bytes().to_vec(), false),
        };
        Ok(Self {
            reader,
            delimiter,
            strip_cr,
            done: false,
        })
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let last = *self.delimiter.last()?;
        let mut segment = Vec::new();
        loop {
            match self.reader.read_until(last, &mut segment) {
                Ok(0) => {
                    self.done = true;
                    if segment.is_empty() {
                        return None;
                    }
                    break;
                }
                Ok(_) if segment.ends_with(&self.delimiter) => {
                    segment.truncate(segment.len() - self.delimiter.len());
                    break;
                }
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }
        }
        if self.strip_cr && segment.last() == Some(&b'\r') {
            segment.pop();
        }
        Some(
            String::from_utf8(segment)
                .map(Value::String)
                .map_err(|err| JsqError::Decode(format!("line is not valid UTF-8: {err}"))),
        )
    }
}

fn single_byte(text: &str, what: &str) -> Result<u8> {
    match text.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(JsqError::InvalidArgument(format!(
            "csv {what} must be a single ASCII character, got {text:?}"
        ))),
    }
}

fn csv_records<R>(input: R, options: &InputOptions) -> Result<ValueStream>
where
    R: Read + 'static,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(options.headers)
        .flexible(options.flexible)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        });
    if let Some(delimiter) = &options.delimiter {
        builder.delimiter(single_byte(delimiter, "delimiter")?);
    }
    if let Some(quote) = options.quote {
        builder.quote(single_byte(&quote.to_string(), "quote")?);
    }

    let mut reader = builder.from_reader(input);
    if !options.headers {
        let rows = reader.into_records().map(|row| -> Result<Value> {
            let row = row?;
            Ok(Value::Array(
                row.iter().map(|field| Value::String(field.to_string())).collect(),
            ))
        });
        return Ok(ValueStream::new(rows));
    }

    let headers = reader.headers()?.clone();
    let rows = reader.into_records().map(move |row| -> Result<Value> {
        let row = row?;
        let record: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(key, field)| (key.to_string(), Value::String(field.to_string())))
            .collect();
        Ok(Value::Object(record))
    });
    Ok(ValueStream::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn decode_text(text: &'static str, format: InputFormat) -> InputSource {
        decode(Cursor::new(text), format, &InputOptions::default()).unwrap()
    }

    fn drain(source: InputSource) -> Vec<Value> {
        source.into_materialized().unwrap()
    }

    #[test]
    fn json_arrays_are_materialized() {
        assert!(matches!(
            decode_text("[1, 2]", InputFormat::Json),
            InputSource::Materialized(_)
        ));
        assert!(matches!(
            decode_text("{\"a\": 1}", InputFormat::Json),
            InputSource::Resolved(_)
        ));
    }

    #[test]
    fn ndjson_skips_blank_and_malformed_lines() {
        let source = decode_text("{\"a\":1}\n\n{oops\n{\"a\":3}\n", InputFormat::Ndjson);
        assert!(source.is_streamed());
        assert_eq!(drain(source), vec![json!({"a": 1}), json!({"a": 3})]);
    }

    #[test]
    fn ndjson_skips_lines_that_are_not_utf8() {
        let input: &'static [u8] = b"{\"a\":1}\n\xff\xfe\n{\"a\":3}\n";
        let source = decode(Cursor::new(input), InputFormat::Ndjson, &InputOptions::default()).unwrap();
        assert_eq!(drain(source), vec![json!({"a": 1}), json!({"a": 3})]);
    }

    #[test]
    fn lines_strip_newlines_and_carriage_returns() {
        let source = decode_text("a\r\nb\n\nc\n", InputFormat::Lines);
        assert_eq!(drain(source), vec![json!("a"), json!("b"), json!(""), json!("c")]);
    }

    #[test]
    fn lines_honour_a_custom_delimiter() {
        let options = InputOptions {
            delimiter: Some("||".to_string()),
            ..InputOptions::default()
        };
        let source = decode(Cursor::new("a||b|c||"), InputFormat::Lines, &options).unwrap();
        assert_eq!(drain(source), vec![json!("a"), json!("b|c")]);
    }

    #[test]
    fn csv_rows_become_objects() {
        let source = decode_text("name,age\nann,31\nbo,4\n", InputFormat::Csv);
        assert_eq!(
            drain(source),
            vec![
                json!({"name": "ann", "age": "31"}),
                json!({"name": "bo", "age": "4"})
            ]
        );
    }

    #[test]
    fn csv_without_headers_yields_arrays() {
        let options = InputOptions::from_json(json!({"headers": false, "delimiter": ";"})).unwrap();
        let source = decode(Cursor::new("a;b\nc;d\n"), InputFormat::Csv, &options).unwrap();
        assert_eq!(drain(source), vec![json!(["a", "b"]), json!(["c", "d"])]);
    }

    #[test]
    fn yaml_documents_decode() {
        let source = decode_text("name: jsq\ntags: [a, b]\n", InputFormat::Yaml);
        assert_eq!(source.into_value().unwrap(), json!({"name": "jsq", "tags": ["a", "b"]}));
    }

    #[test]
    fn bad_options_are_rejected() {
        let err = InputOptions::from_json(json!({"headers": "yes"})).unwrap_err();
        assert!(matches!(err, JsqError::InvalidArgument(_)));
        let options = InputOptions {
            delimiter: Some("ab".to_string()),
            ..InputOptions::default()
        };
        assert!(decode(Cursor::new(""), InputFormat::Csv, &options).is_err());
    }
}
