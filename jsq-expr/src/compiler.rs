//! Alias rewriting
//!
//! Rhai has no `$` identifiers and treats a lone `_` as a keyword, so the
//! aliases are rewritten to plain bindings before the engine sees the text.
//! The scanner understands comments, string and character literals and
//! back-tick strings with `${..}` interpolation, so aliases inside literals
//! are left alone. Every emitted character remembers the original column it
//! came from, which lets parse errors point into the user's own text.

use jsq_format::CompileError;
use rhai::ParseError;

/// Binding holding the current value (`$`).
pub const SELF_BINDING: &str = "jsq_self";
/// Binding holding the chain wrapper (`$$`).
pub const CHAIN_BINDING: &str = "jsq_chain";
/// Binding holding the utility namespace (`_`).
pub const LIB_BINDING: &str = "jsq_lo";
/// Binding holding the curried namespace.
pub const FP_BINDING: &str = "fp";
/// Stands in for `$` inside longer identifiers such as `$price`.
pub const DOLLAR_MARK: &str = "jsq_dollar_";

/// Engine spelling of an identifier that may contain `$`.
pub fn mangle(name: &str) -> String {
    name.replace('$', DOLLAR_MARK)
}

/// Undo [`mangle`] and the alias bindings in engine text.
pub fn unmangle(text: &str) -> String {
    text.replace(DOLLAR_MARK, "$")
        .replace(CHAIN_BINDING, "$$")
        .replace(SELF_BINDING, "$")
        .replace(LIB_BINDING, "_")
}

/// Expression used when none is given.
const IDENTITY: &str = "$";

/// Map an absent expression or the `.` placeholder to the identity.
pub fn normalize_expression(expression: Option<&str>) -> &str {
    match expression {
        None => IDENTITY,
        Some(text) if text.trim() == "." => IDENTITY,
        Some(text) => text,
    }
}

/// Output of [`rewrite`].
#[derive(Debug, Clone)]
pub struct Rewritten {
    /// Text handed to the engine
    pub text: String,
    columns: Vec<Vec<usize>>,
}

impl Rewritten {
    /// Original 0-based column for a 1-based engine position on a 1-based line.
    pub fn original_column(&self, line: usize, position: usize) -> usize {
        let Some(columns) = self.columns.get(line.saturating_sub(1)) else {
            return 0;
        };
        match columns.get(position.saturating_sub(1)) {
            Some(column) => *column,
            None => columns.last().map(|column| column + 1).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    Code,
    Template,
    Interpolation(usize),
}

struct Scanner {
    src: Vec<char>,
    pos: usize,
    col: usize,
    out: String,
    columns: Vec<Vec<usize>>,
    // (byte offset in `out`, line index, index within the line)
    terminator: Option<(usize, usize, usize)>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            src: source.chars().collect(),
            pos: 0,
            col: 0,
            out: String::with_capacity(source.len() + 16),
            columns: vec![Vec::new()],
            terminator: None,
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.src.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<(char, usize)> {
        let c = *self.src.get(self.pos)?;
        let col = self.col;
        self.pos += 1;
        if c == '\n' {
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some((c, col))
    }

    fn emit(&mut self, c: char, col: usize) {
        self.out.push(c);
        if c == '\n' {
            self.columns.push(Vec::new());
        } else if let Some(line) = self.columns.last_mut() {
            line.push(col);
        }
    }

    fn emit_str(&mut self, text: &str, col: usize) {
        for c in text.chars() {
            self.emit(c, col);
        }
    }

    fn copy(&mut self) {
        if let Some((c, col)) = self.bump() {
            self.emit(c, col);
        }
    }

    fn significant(&mut self) {
        self.terminator = None;
    }

    fn run(mut self) -> Rewritten {
        let mut stack = vec![Frame::Code];
        while let Some(c) = self.peek(0) {
            match stack.last().copied().unwrap_or(Frame::Code) {
                Frame::Template => self.template(c, &mut stack),
                Frame::Code | Frame::Interpolation(_) => self.code(c, &mut stack),
            }
        }

        if let Some((offset, line, index)) = self.terminator {
            self.out.remove(offset);
            if let Some(columns) = self.columns.get_mut(line) {
                if index < columns.len() {
                    columns.remove(index);
                }
            }
        }

        Rewritten {
            text: self.out,
            columns: self.columns,
        }
    }

    fn template(&mut self, c: char, stack: &mut Vec<Frame>) {
        match c {
            '`' => {
                self.copy();
                stack.pop();
            }
            '$' if self.peek(1) == Some('{') => {
                self.copy();
                self.copy();
                stack.push(Frame::Interpolation(0));
            }
            _ => self.copy(),
        }
    }

    fn code(&mut self, c: char, stack: &mut Vec<Frame>) {
        match c {
            '/' if self.peek(1) == Some('/') => {
                while let Some(next) = self.peek(0) {
                    if next == '\n' {
                        break;
                    }
                    self.copy();
                }
            }
            '/' if self.peek(1) == Some('*') => self.block_comment(),
            '"' | '\'' => {
                self.quoted(c);
                self.significant();
            }
            '`' => {
                self.copy();
                stack.push(Frame::Template);
                self.significant();
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                self.word();
                self.significant();
            }
            '{' => {
                if let Some(Frame::Interpolation(depth)) = stack.last_mut() {
                    *depth += 1;
                }
                self.copy();
                self.significant();
            }
            '}' => {
                if matches!(stack.last(), Some(Frame::Interpolation(0))) {
                    stack.pop();
                } else if let Some(Frame::Interpolation(depth)) = stack.last_mut() {
                    *depth -= 1;
                }
                self.copy();
                self.significant();
            }
            ';' => {
                self.copy();
                if stack.len() == 1 {
                    let line = self.columns.len() - 1;
                    let index = self.columns[line].len().saturating_sub(1);
                    self.terminator = Some((self.out.len() - 1, line, index));
                } else {
                    self.significant();
                }
            }
            c if c.is_whitespace() => self.copy(),
            _ => {
                self.copy();
                self.significant();
            }
        }
    }

    fn word(&mut self) {
        let start = self.pos;
        let mut end = start;
        while self
            .src
            .get(end)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        {
            end += 1;
        }
        let word: String = self.src[start..end].iter().collect();
        let next = self.src[end..].iter().find(|c| !c.is_whitespace());

        let alias = match word.as_str() {
            "$" => Some(SELF_BINDING),
            "$$" => Some(CHAIN_BINDING),
            "_" if next == Some(&'.') => Some(LIB_BINDING),
            _ => None,
        };
        if let Some(binding) = alias {
            let col = self.col;
            for _ in start..end {
                self.bump();
            }
            self.emit_str(binding, col);
            return;
        }

        for _ in start..end {
            match self.bump() {
                Some(('$', col)) => self.emit_str(DOLLAR_MARK, col),
                Some((c, col)) => self.emit(c, col),
                None => break,
            }
        }
    }

    fn quoted(&mut self, delimiter: char) {
        self.copy();
        while let Some(c) = self.peek(0) {
            if c == '\\' {
                self.copy();
                self.copy();
            } else if c == delimiter {
                self.copy();
                break;
            } else {
                self.copy();
            }
        }
    }

    fn block_comment(&mut self) {
        self.copy();
        self.copy();
        let mut depth = 1usize;
        while let Some(c) = self.peek(0) {
            if c == '/' && self.peek(1) == Some('*') {
                self.copy();
                self.copy();
                depth += 1;
            } else if c == '*' && self.peek(1) == Some('/') {
                self.copy();
                self.copy();
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else {
                self.copy();
            }
        }
    }
}

/// Rewrite aliases and drop a trailing top-level `;` so the last statement
/// is the program value.
pub fn rewrite(source: &str) -> Rewritten {
    Scanner::new(source).run()
}

/// Translate an engine parse error into a positioned [`CompileError`].
pub fn compile_error(source: &str, rewritten: &Rewritten, err: &ParseError) -> CompileError {
    let message = unmangle(&err.err_type().to_string());

    let lines: Vec<&str> = source.split('\n').collect();
    let position = err.position();
    let (line, column) = match (position.line(), position.position()) {
        (Some(line), Some(pos)) => (line, rewritten.original_column(line, pos)),
        (Some(line), None) => (line, 0),
        _ => {
            let last = lines.len().max(1);
            let width = lines.last().map(|text| text.chars().count()).unwrap_or(0);
            (last, width)
        }
    };

    let source_line = lines
        .get(line.saturating_sub(1))
        .map(|text| text.trim_end_matches('\r').to_string())
        .unwrap_or_default();

    CompileError {
        message,
        line,
        column,
        source_line,
    }
}
