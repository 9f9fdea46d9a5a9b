//! Box-drawn table layout

use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use super::{plain_text, render, render_raw, tabular_rows, RenderOptions};
use crate::error::{JsqError, Result};

struct Border {
    left: char,
    body: char,
    join: char,
    right: char,
}

const TOP: Border = Border {
    left: '╔',
    body: '═',
    join: '╤',
    right: '╗',
};
const MIDDLE: Border = Border {
    left: '╟',
    body: '─',
    join: '┼',
    right: '╢',
};
const BOTTOM: Border = Border {
    left: '╚',
    body: '═',
    join: '╧',
    right: '╝',
};

pub(super) fn render_table(value: &Value, opts: &RenderOptions) -> Result<String> {
    let first_is_record = |items: &[Value]| {
        matches!(items.first(), Some(Value::Object(_)) | Some(Value::Array(_)) | Some(Value::Null))
    };
    match value {
        Value::Array(items) if !first_is_record(items) => {
            let joined = items.iter().map(plain_text).collect::<Vec<_>>().join(", ");
            return Ok(render_raw(&Value::String(joined), opts));
        }
        Value::Array(_) | Value::Object(_) => {}
        scalar => return Ok(render_raw(scalar, opts)),
    }

    let rows = tabular_rows(value).unwrap_or_default();
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    let columns: Vec<String> = match first {
        Value::Object(map) => map.keys().cloned().collect(),
        Value::Array(items) => (0..items.len()).map(|idx| idx.to_string()).collect(),
        _ => {
            return Err(JsqError::Unsupported(format!(
                "Table format requires an array of objects {}",
                plain_text(value)
            )))
        }
    };

    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(columns.clone());
    for row in &rows {
        let mut cells = Vec::with_capacity(columns.len());
        for column in &columns {
            let cell = match lookup(row, column) {
                Some(cell) => render(cell, opts.inner_format, opts)?,
                None => String::new(),
            };
            cells.push(cell);
        }
        grid.push(cells);
    }

    Ok(layout(&grid))
}

fn lookup<'a>(row: &'a Value, column: &str) -> Option<&'a Value> {
    match row {
        Value::Object(map) => map.get(column),
        Value::Array(items) => column.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    }
}

/// Draw `grid` (header first). Rules go at the top, under the header and at
/// the bottom; when any cell spans several lines every row gets a rule.
pub(super) fn layout(grid: &[Vec<String>]) -> String {
    let column_count = grid.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; column_count];
    for row in grid {
        for (idx, cell) in row.iter().enumerate() {
            for line in cell.split('\n') {
                widths[idx] = widths[idx].max(display_width(line));
            }
        }
    }

    let multiline = grid.iter().flatten().any(|cell| cell.contains('\n'));
    let count = grid.len();
    let mut lines = Vec::new();

    for (idx, row) in grid.iter().enumerate() {
        if multiline || idx <= 1 {
            let border = if idx == 0 { &TOP } else { &MIDDLE };
            lines.push(rule(border, &widths));
        }
        let height = row.iter().map(|cell| cell.split('\n').count()).max().unwrap_or(1);
        for line_idx in 0..height {
            let mut line = String::from("║");
            for (col, width) in widths.iter().enumerate() {
                if col > 0 {
                    line.push('│');
                }
                let text = row
                    .get(col)
                    .and_then(|cell| cell.split('\n').nth(line_idx))
                    .unwrap_or("");
                line.push(' ');
                line.push_str(text);
                line.push_str(&" ".repeat(width - display_width(text)));
                line.push(' ');
            }
            line.push('║');
            lines.push(line);
        }
    }
    if count > 0 {
        lines.push(rule(&BOTTOM, &widths));
    }
    lines.join("\n")
}

fn rule(border: &Border, widths: &[usize]) -> String {
    let mut line = String::new();
    line.push(border.left);
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push(border.join);
        }
        line.extend(std::iter::repeat(border.body).take(width + 2));
    }
    line.push(border.right);
    line
}

/// Terminal columns taken by `text`, ignoring ANSI colour sequences.
fn display_width(text: &str) -> usize {
    let mut visible = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            for next in chars.by_ref() {
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        visible.push(c);
    }
    UnicodeWidthStr::width(visible.as_str())
}
