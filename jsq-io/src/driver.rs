//! Evaluation driver
//!
//! Reconciles the shape of the input with what the user asked for, applies
//! the program per item (streams) or once (everything else) and reshapes
//! the result before it is printed.

use std::rc::Rc;
use std::str::FromStr;

use jsq_expr::Program;
use jsq_format::{InputSource, JsqError, Result};
use tracing::debug;

/// Requested sequence shape for `--as` / `--to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Single-pass sequence, evaluated and printed item by item
    Stream,
    /// Finite array, evaluated as a whole
    Array,
}

impl FromStr for Shape {
    type Err = JsqError;

    fn from_str(text: &str) -> Result<Self> {
        match text {
            "stream" => Ok(Shape::Stream),
            "array" => Ok(Shape::Array),
            other => Err(JsqError::InvalidArgument(format!(
                "expected 'stream' or 'array', got '{other}'"
            ))),
        }
    }
}

/// Parse a `--take` count. Only non-negative integers are accepted.
pub fn parse_take(text: &str) -> Result<usize> {
    text.trim()
        .parse::<usize>()
        .map_err(|_| JsqError::InvalidArgument(format!("Invalid value for --take: {text}")))
}

/// Driver settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Keep only the first N input items
    pub take: Option<usize>,
    /// Force the input shape (`--as`)
    pub input_shape: Option<Shape>,
    /// Force the result shape (`--to`)
    pub output_shape: Option<Shape>,
}

/// Convert `source` to `shape`. Draining a stream into an array blocks until
/// the input is exhausted.
pub fn reshape(source: InputSource, shape: Shape) -> Result<InputSource> {
    match shape {
        Shape::Stream => source.into_stream().map(InputSource::Streamed),
        Shape::Array => source.into_materialized().map(InputSource::Materialized),
    }
}

/// Keep the first `n` items. Streams are limited lazily.
pub fn truncate(source: InputSource, n: usize) -> Result<InputSource> {
    match source {
        InputSource::Streamed(stream) => Ok(InputSource::Streamed(stream.take(n))),
        InputSource::Materialized(mut items) => {
            items.truncate(n);
            Ok(InputSource::Materialized(items))
        }
        InputSource::Resolved(_) => Err(JsqError::Unsupported(
            "Cannot take items from input".to_string(),
        )),
    }
}

/// Evaluate `program` over `source`: per item for streams, once otherwise.
pub fn apply(source: InputSource, program: Rc<Program>) -> Result<InputSource> {
    match source {
        InputSource::Streamed(stream) => Ok(InputSource::Streamed(
            stream.and_then(move |item| program.evaluate(item)),
        )),
        InputSource::Materialized(items) => program
            .evaluate(jsq_format::Value::Array(items))
            .map(InputSource::from_document),
        InputSource::Resolved(value) => program.evaluate(value).map(InputSource::from_document),
    }
}

/// Run the whole pipeline: reshape input, truncate, evaluate, reshape result.
pub fn run(source: InputSource, program: Rc<Program>, options: &EvalOptions) -> Result<InputSource> {
    let mut source = source;
    if let Some(shape) = options.input_shape {
        debug!(?shape, "reshaping input");
        source = reshape(source, shape)?;
    }
    if let Some(n) = options.take {
        debug!(n, "truncating input");
        source = truncate(source, n)?;
    }
    let result = apply(source, program)?;
    match options.output_shape {
        Some(shape) => {
            debug!(?shape, "reshaping result");
            reshape(result, shape)
        }
        None => Ok(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsq_format::{Value, ValueStream};
    use serde_json::json;

    fn program(expression: &str) -> Rc<Program> {
        Rc::new(Program::compile(expression).unwrap())
    }

    fn streamed(values: Vec<Value>) -> InputSource {
        InputSource::Streamed(ValueStream::from_values(values))
    }

    #[test]
    fn shapes_parse() {
        assert_eq!("stream".parse::<Shape>().unwrap(), Shape::Stream);
        assert_eq!("array".parse::<Shape>().unwrap(), Shape::Array);
        assert!(matches!("list".parse::<Shape>(), Err(JsqError::InvalidArgument(_))));
    }

    #[test]
    fn take_accepts_only_counts() {
        assert_eq!(parse_take("3").unwrap(), 3);
        assert_eq!(parse_take("0").unwrap(), 0);
        assert!(parse_take("-1").is_err());
        assert!(parse_take("two").is_err());
    }

    #[test]
    fn streams_are_evaluated_per_item() {
        let result = run(
            streamed(vec![json!(1), json!(2)]),
            program("$ * 10"),
            &EvalOptions::default(),
        )
        .unwrap();
        assert!(result.is_streamed());
        assert_eq!(result.into_materialized().unwrap(), vec![json!(10), json!(20)]);
    }

    #[test]
    fn arrays_are_evaluated_once() {
        let result = run(
            InputSource::Materialized(vec![json!(1), json!(2)]),
            program("$.len()"),
            &EvalOptions::default(),
        )
        .unwrap();
        assert_eq!(result.into_value().unwrap(), json!(2));
    }

    #[test]
    fn take_zero_empties_any_sequence() {
        let options = EvalOptions {
            take: Some(0),
            ..EvalOptions::default()
        };
        let from_stream = run(streamed(vec![json!(1)]), program("$"), &options).unwrap();
        assert!(from_stream.into_materialized().unwrap().is_empty());
        let from_array = run(InputSource::Materialized(vec![json!(1)]), program("$"), &options)
            .unwrap();
        assert_eq!(from_array.into_value().unwrap(), json!([]));
    }

    #[test]
    fn take_on_a_document_is_unsupported() {
        let options = EvalOptions {
            take: Some(1),
            ..EvalOptions::default()
        };
        let err = run(InputSource::Resolved(json!({"a": 1})), program("$"), &options).unwrap_err();
        assert!(matches!(err, JsqError::Unsupported(_)));
    }

    #[test]
    fn as_array_then_to_stream_keeps_order() {
        let options = EvalOptions {
            input_shape: Some(Shape::Array),
            output_shape: Some(Shape::Stream),
            ..EvalOptions::default()
        };
        let values: Vec<Value> = (0..5).map(|n| json!(n)).collect();
        let result = run(streamed(values.clone()), program("$"), &options).unwrap();
        assert!(result.is_streamed());
        assert_eq!(result.into_materialized().unwrap(), values);
    }

    #[test]
    fn objects_stream_their_values() {
        let options = EvalOptions {
            input_shape: Some(Shape::Stream),
            ..EvalOptions::default()
        };
        let result = run(InputSource::Resolved(json!({"a": 1, "b": 2})), program("$ + 1"), &options)
            .unwrap();
        assert_eq!(result.into_materialized().unwrap(), vec![json!(2), json!(3)]);
    }

    #[test]
    fn scalars_cannot_be_reshaped() {
        let err = reshape(InputSource::Resolved(json!(5)), Shape::Array).unwrap_err();
        assert!(matches!(err, JsqError::Unsupported(_)));
    }

    #[test]
    fn evaluation_errors_surface_lazily() {
        let result = run(streamed(vec![json!(1)]), program("throw \"bad\""), &EvalOptions::default())
            .unwrap();
        assert!(matches!(result.into_materialized(), Err(JsqError::Runtime(_))));
    }
}
