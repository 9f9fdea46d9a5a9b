//! JSON text with optional ANSI colouring

use colored::Colorize;
use serde_json::Value;

#[derive(Clone, Copy)]
enum Token {
    Key,
    Str,
    Num,
    Bool,
    Null,
    Punct,
}

fn paint(text: &str, token: Token, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let painted = match token {
        Token::Key => text.blue(),
        Token::Str => text.green(),
        Token::Num => text.yellow(),
        Token::Bool => text.magenta(),
        Token::Null => text.bright_black(),
        Token::Punct => text.white(),
    };
    painted.to_string()
}

/// Serialize `value` as JSON.
///
/// `indent == 0` produces compact output; otherwise nested containers are
/// broken onto separate lines the way `serde_json::to_string_pretty` does.
pub fn to_json(value: &Value, indent: usize, color: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, indent, 0, color);
    out
}

fn quoted(text: &str) -> String {
    // Serializing a str cannot fail.
    serde_json::to_string(text).unwrap_or_default()
}

fn newline(out: &mut String, indent: usize, depth: usize) {
    if indent > 0 {
        out.push('\n');
        out.push_str(&" ".repeat(indent * depth));
    }
}

fn write_value(out: &mut String, value: &Value, indent: usize, depth: usize, color: bool) {
    match value {
        Value::Null => out.push_str(&paint("null", Token::Null, color)),
        Value::Bool(b) => out.push_str(&paint(&b.to_string(), Token::Bool, color)),
        Value::Number(n) => out.push_str(&paint(&n.to_string(), Token::Num, color)),
        Value::String(s) => out.push_str(&paint(&quoted(s), Token::Str, color)),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str(&paint("[]", Token::Punct, color));
                return;
            }
            out.push_str(&paint("[", Token::Punct, color));
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(&paint(",", Token::Punct, color));
                }
                newline(out, indent, depth + 1);
                write_value(out, item, indent, depth + 1, color);
            }
            newline(out, indent, depth);
            out.push_str(&paint("]", Token::Punct, color));
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str(&paint("{}", Token::Punct, color));
                return;
            }
            out.push_str(&paint("{", Token::Punct, color));
            for (idx, (key, item)) in map.iter().enumerate() {
                if idx > 0 {
                    out.push_str(&paint(",", Token::Punct, color));
                }
                newline(out, indent, depth + 1);
                out.push_str(&paint(&quoted(key), Token::Key, color));
                out.push_str(&paint(":", Token::Punct, color));
                if indent > 0 {
                    out.push(' ');
                }
                write_value(out, item, indent, depth + 1, color);
            }
            newline(out, indent, depth);
            out.push_str(&paint("}", Token::Punct, color));
        }
    }
}
