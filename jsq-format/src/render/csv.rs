//! Delimited output

use serde_json::Value;

use super::{render, render_raw, tabular_rows, RenderOptions};
use crate::error::{JsqError, Result};

pub(super) fn render_csv(value: &Value, opts: &RenderOptions) -> Result<String> {
    let Some(rows) = tabular_rows(value) else {
        return Ok(render_raw(value, opts));
    };

    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(opts.csv_delimiter)
        .from_writer(Vec::new());

    let headers: Option<Vec<String>> = match rows.first() {
        Some(Value::Object(map)) if opts.csv_headers => Some(map.keys().cloned().collect()),
        _ => None,
    };
    if let Some(headers) = &headers {
        writer.write_record(headers)?;
    }

    for row in &rows {
        let cells: Vec<String> = match (row, &headers) {
            (Value::Object(map), Some(headers)) => headers
                .iter()
                .map(|key| match map.get(key) {
                    Some(cell) => render(cell, opts.inner_format, opts),
                    None => Ok(String::new()),
                })
                .collect::<Result<_>>()?,
            (Value::Object(map), None) => map
                .values()
                .map(|cell| render(cell, opts.inner_format, opts))
                .collect::<Result<_>>()?,
            (Value::Array(items), _) => items
                .iter()
                .map(|cell| render(cell, opts.inner_format, opts))
                .collect::<Result<_>>()?,
            (scalar, _) => vec![render(scalar, opts.inner_format, opts)?],
        };
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| JsqError::Io(err.into_error()))?;
    let text = String::from_utf8(bytes)
        .map_err(|err| JsqError::Unsupported(format!("csv output is not UTF-8: {err}")))?;
    Ok(text.trim_end_matches('\n').to_string())
}
