//! Materialized and streamed input sources

use std::fmt;

use serde_json::Value;

use crate::error::{JsqError, Result};

/// Single-pass producer of values.
///
/// Wraps a boxed iterator so decoders, the driver and the printer can chain
/// lazy stages without naming their concrete types. The stream is moved
/// between stages and never cloned.
pub struct ValueStream {
    inner: Box<dyn Iterator<Item = Result<Value>>>,
}

impl ValueStream {
    /// Wrap any iterator of fallible values.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<Value>> + 'static,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    /// Stream over already available values.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::new(values.into_iter().map(Ok))
    }

    /// Limit the stream to its first `n` elements without reading the rest.
    pub fn take(self, n: usize) -> Self {
        Self::new(self.inner.take(n))
    }

    /// Lazily apply `f` to every successfully produced element.
    pub fn and_then<F>(self, mut f: F) -> Self
    where
        F: FnMut(Value) -> Result<Value> + 'static,
    {
        Self::new(self.inner.map(move |item| item.and_then(&mut f)))
    }

    /// Drain the stream, stopping at the first error.
    pub fn collect_values(self) -> Result<Vec<Value>> {
        self.inner.collect()
    }
}

impl Iterator for ValueStream {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for ValueStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueStream { .. }")
    }
}

/// Data flowing between decoder, driver and renderer.
#[derive(Debug)]
pub enum InputSource {
    /// Finite, replayable sequence
    Materialized(Vec<Value>),
    /// Single-pass sequence
    Streamed(ValueStream),
    /// A whole document that is not a sequence (object or scalar)
    Resolved(Value),
}

impl InputSource {
    /// Classify a decoded document: arrays become `Materialized`.
    pub fn from_document(value: Value) -> Self {
        match value {
            Value::Array(items) => InputSource::Materialized(items),
            other => InputSource::Resolved(other),
        }
    }

    /// True for the `Streamed` variant.
    pub fn is_streamed(&self) -> bool {
        matches!(self, InputSource::Streamed(_))
    }

    /// Convert into a stream. Objects stream their values; scalars are rejected.
    pub fn into_stream(self) -> Result<ValueStream> {
        match self {
            InputSource::Streamed(stream) => Ok(stream),
            InputSource::Materialized(items) => Ok(ValueStream::from_values(items)),
            InputSource::Resolved(value) => Ok(ValueStream::from_values(sequence_items(value)?)),
        }
    }

    /// Convert into a finite sequence, draining a stream if needed.
    pub fn into_materialized(self) -> Result<Vec<Value>> {
        match self {
            InputSource::Streamed(stream) => stream.collect_values(),
            InputSource::Materialized(items) => Ok(items),
            InputSource::Resolved(value) => sequence_items(value),
        }
    }

    /// Collapse into a single value; streams are drained into an array.
    pub fn into_value(self) -> Result<Value> {
        match self {
            InputSource::Streamed(stream) => Ok(Value::Array(stream.collect_values()?)),
            InputSource::Materialized(items) => Ok(Value::Array(items)),
            InputSource::Resolved(value) => Ok(value),
        }
    }
}

/// Elements of an array or values of an object.
fn sequence_items(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(map.into_iter().map(|(_, v)| v).collect()),
        other => Err(JsqError::Unsupported(format!(
            "cannot treat a {} as a sequence",
            type_name(&other)
        ))),
    }
}

/// Lowercase JSON type name used in diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
