//! Decode, evaluate and print in one call

use std::fs::File;
use std::io::{Cursor, Write};
use std::rc::Rc;

use jsq_io::{execute, EvalOptions, ExecuteRequest, InputFormat, OutputFormat, Program, Shape};
use proptest::prelude::*;

fn run(expression: &str, input: &'static str, request: &ExecuteRequest) -> String {
    let program = Rc::new(Program::compile(expression).unwrap());
    let mut out = Vec::new();
    execute(program, Cursor::new(input), &mut out, request).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn ndjson_with_a_malformed_middle_line_yields_two_records() {
    let request = ExecuteRequest {
        input_format: InputFormat::Ndjson,
        output_format: OutputFormat::Json,
        ..ExecuteRequest::default()
    };
    let out = run("$", "{\"n\":1}\nnot json\n{\"n\":3}\n", &request);
    assert_eq!(out, "{\"n\":1}\n{\"n\":3}\n");
}

#[test]
fn csv_to_table() {
    let request = ExecuteRequest {
        input_format: InputFormat::Csv,
        output_format: OutputFormat::Table,
        ..ExecuteRequest::default()
    };
    let out = run("$", "a\n1\n2\n", &request);
    assert_eq!(out, "╔═══╗\n║ a ║\n╟───╢\n║ 1 ║\n║ 2 ║\n╚═══╝\n");
}

const USERS: &str = r#"{"users": [{"name": "ann", "age": 31}, {"name": "bo", "age": 4}]}"#;

#[test]
fn path_results_keep_input_key_order() {
    let request = ExecuteRequest {
        output_format: OutputFormat::Json,
        ..ExecuteRequest::default()
    };
    assert_eq!(run("$.users[0]", USERS, &request), "{\"name\":\"ann\",\"age\":31}\n");
}

#[test]
fn table_columns_follow_input_key_order() {
    let request = ExecuteRequest {
        output_format: OutputFormat::Table,
        ..ExecuteRequest::default()
    };
    let out = run("$.users", USERS, &request);
    assert!(out.contains("║ name │ age ║"), "{out}");
}

#[test]
fn lines_collected_into_an_array() {
    let request = ExecuteRequest {
        input_format: InputFormat::Lines,
        output_format: OutputFormat::Json,
        eval: EvalOptions {
            input_shape: Some(Shape::Array),
            ..EvalOptions::default()
        },
        ..ExecuteRequest::default()
    };
    assert_eq!(run("$.len()", "a\nb\nc\n", &request), "3\n");
}

#[test]
fn files_are_read_lazily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.ndjson");
    let mut file = File::create(&path).unwrap();
    for n in 0..100 {
        writeln!(file, "{{\"n\":{n}}}").unwrap();
    }
    drop(file);

    let request = ExecuteRequest {
        input_format: InputFormat::Ndjson,
        eval: EvalOptions {
            take: Some(2),
            ..EvalOptions::default()
        },
        ..ExecuteRequest::default()
    };
    let program = Rc::new(Program::compile("$.n").unwrap());
    let mut out = Vec::new();
    execute(program, File::open(&path).unwrap(), &mut out, &request).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "0\n1\n");
}

proptest! {
    #[test]
    fn take_limits_streamed_output(len in 0usize..20, n in 0usize..25) {
        let input: String = (0..len).map(|i| format!("{i}\n")).collect();
        let request = ExecuteRequest {
            input_format: InputFormat::Ndjson,
            eval: EvalOptions { take: Some(n), ..EvalOptions::default() },
            ..ExecuteRequest::default()
        };
        let program = Rc::new(Program::compile("$").unwrap());
        let mut out = Vec::new();
        execute(program, Cursor::new(input), &mut out, &request).unwrap();
        let printed = String::from_utf8(out).unwrap();
        prop_assert_eq!(printed.lines().count(), len.min(n));
    }
}
