//! Streaming output

use std::io::Write;

use jsq_format::{render, InputSource, OutputFormat, RenderOptions, Result};

/// Print `source` to `sink`.
///
/// Streams are rendered item by item, each followed by the delimiter and
/// flushed, unless the format needs every row up front (`csv`, `table`).
/// Everything else is rendered once and followed by a newline; an empty
/// rendering prints nothing.
pub fn print<W>(source: InputSource, format: OutputFormat, opts: &RenderOptions, sink: &mut W) -> Result<()>
where
    W: Write + ?Sized,
{
    match source {
        InputSource::Streamed(stream) if !format.requires_buffering() => {
            for item in stream {
                let text = render(&item?, format, opts)?;
                sink.write_all(text.as_bytes())?;
                sink.write_all(opts.delimiter.as_bytes())?;
                sink.flush()?;
            }
        }
        source => {
            let value = source.into_value()?;
            let text = render(&value, format, opts)?;
            if !text.is_empty() {
                sink.write_all(text.as_bytes())?;
                sink.write_all(b"\n")?;
            }
            sink.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsq_format::ValueStream;
    use serde_json::json;

    fn printed(source: InputSource, format: OutputFormat, opts: &RenderOptions) -> String {
        let mut out = Vec::new();
        print(source, format, opts, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn streams_are_delimited_per_item() {
        let source = InputSource::Streamed(ValueStream::from_values(vec![json!("a"), json!({"b": 1})]));
        assert_eq!(
            printed(source, OutputFormat::Json, &RenderOptions::default()),
            "\"a\"\n{\"b\":1}\n"
        );
    }

    #[test]
    fn custom_delimiter_is_used() {
        let opts = RenderOptions {
            delimiter: ",".to_string(),
            ..RenderOptions::default()
        };
        let source = InputSource::Streamed(ValueStream::from_values(vec![json!(1), json!(2)]));
        assert_eq!(printed(source, OutputFormat::Raw, &opts), "1,2,");
    }

    #[test]
    fn documents_end_with_a_newline() {
        let source = InputSource::Resolved(json!("hello"));
        assert_eq!(printed(source, OutputFormat::Raw, &RenderOptions::default()), "hello\n");
    }

    #[test]
    fn tables_drain_streams_first() {
        let source = InputSource::Streamed(ValueStream::from_values(vec![json!({"a": 1})]));
        let text = printed(source, OutputFormat::Csv, &RenderOptions::default());
        assert_eq!(text, "a\n1\n");
    }

    #[test]
    fn empty_tables_print_nothing() {
        let source = InputSource::Materialized(Vec::new());
        assert_eq!(printed(source, OutputFormat::Table, &RenderOptions::default()), "");
    }

    #[test]
    fn stream_errors_stop_printing() {
        let stream = ValueStream::new(
            vec![
                Ok(json!(1)),
                Err(jsq_format::JsqError::Runtime("boom".to_string())),
                Ok(json!(3)),
            ]
            .into_iter(),
        );
        let mut out = Vec::new();
        let err = print(InputSource::Streamed(stream), OutputFormat::Raw, &RenderOptions::default(), &mut out)
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(String::from_utf8(out).unwrap(), "1\n");
    }
}
