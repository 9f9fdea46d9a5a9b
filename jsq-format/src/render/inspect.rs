//! Structural debug dump

use colored::Colorize;
use serde_json::{Number, Value};

use super::RenderOptions;

/// Full-depth dump: bare identifier keys, single-quoted strings, grouped
/// digits, containers wrapped once they exceed the break length.
pub fn inspect(value: &Value, opts: &RenderOptions) -> String {
    format_value(value, 0, opts)
}

fn format_value(value: &Value, depth: usize, opts: &RenderOptions) -> String {
    match value {
        Value::Null => style(opts, "null".to_string(), |s| s.bold().to_string()),
        Value::Bool(b) => style(opts, b.to_string(), |s| s.yellow().to_string()),
        Value::Number(n) => style(opts, group_digits(n), |s| s.yellow().to_string()),
        Value::String(s) => style(opts, quote(s), |s| s.green().to_string()),
        Value::Array(items) => {
            let entries: Vec<String> = items
                .iter()
                .map(|item| format_value(item, depth + 1, opts))
                .collect();
            wrap("[", "]", entries, depth, opts)
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, item)| format!("{}: {}", format_key(key), format_value(item, depth + 1, opts)))
                .collect();
            wrap("{", "}", entries, depth, opts)
        }
    }
}

fn style(opts: &RenderOptions, text: String, paint: impl Fn(&str) -> String) -> String {
    if opts.color {
        paint(&text)
    } else {
        text
    }
}

fn wrap(open: &str, close: &str, entries: Vec<String>, depth: usize, opts: &RenderOptions) -> String {
    if entries.is_empty() {
        return format!("{open}{close}");
    }
    let inline_len: usize = entries.iter().map(|e| e.chars().count() + 2).sum::<usize>()
        + open.len()
        + close.len()
        + depth * 2;
    let multiline = entries.iter().any(|e| e.contains('\n'));
    if !multiline && inline_len <= opts.break_length {
        return format!("{open} {} {close}", entries.join(", "));
    }
    let pad = "  ".repeat(depth + 1);
    let body = entries
        .iter()
        .map(|entry| format!("{pad}{entry}"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{open}\n{body}\n{}{close}", "  ".repeat(depth))
}

fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let identifier = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if identifier {
        key.to_string()
    } else {
        quote(key)
    }
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// `1234567` → `1_234_567`; the fractional part is left alone.
fn group_digits(n: &Number) -> String {
    let text = n.to_string();
    if text.contains(['e', 'E']) {
        return text;
    }
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (rest, None),
    };
    let mut grouped = String::new();
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('_');
        }
        grouped.push(digit);
    }
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
