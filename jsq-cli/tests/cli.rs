use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;

fn jsq() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("jsq")?;
    cmd.env_remove("DEBUG").env_remove("JSQ_LOG");
    Ok(cmd)
}

#[test]
fn identity_pretty_prints_json() -> Result<(), Box<dyn Error>> {
    jsq()?
        .write_stdin(r#"{"a": [1, 2]}"#)
        .assert()
        .success()
        .stdout("{\n  \"a\": [\n    1,\n    2\n  ]\n}\n");
    Ok(())
}

#[test]
fn placeholder_and_compact_json() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args([".", "-o", "json"])
        .write_stdin("[1, 2]")
        .assert()
        .success()
        .stdout("[1,2]\n");
    Ok(())
}

#[test]
fn expression_transforms_arrays() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-o", "json", "$.map(|x| x * 2)"])
        .write_stdin("[1, 2, 3]")
        .assert()
        .success()
        .stdout("[2,4,6]\n");
    Ok(())
}

#[test]
fn ndjson_items_expose_their_keys() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-i", "ndjson", "name + \":\" + age"])
        .write_stdin("{\"name\":\"ann\",\"age\":31}\n{\"name\":\"bo\",\"age\":4}\n")
        .assert()
        .success()
        .stdout("ann:31\nbo:4\n");
    Ok(())
}

#[test]
fn malformed_ndjson_lines_are_skipped_with_a_warning() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-i", "ndjson", "$.n"])
        .write_stdin("{\"n\":1}\n{broken\n{\"n\":3}\n")
        .assert()
        .success()
        .stdout("1\n3\n")
        .stderr(predicate::str::contains("skipping malformed ndjson record"));
    Ok(())
}

#[test]
fn input_format_follows_the_file_extension() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("people.csv");
    fs::write(&path, "name,team\nann,a\nbo,b\n")?;

    jsq()?
        .args(["-o", "json", "$.team"])
        .arg(&path)
        .assert()
        .success()
        .stdout("\"a\"\n\"b\"\n");
    Ok(())
}

#[test]
fn several_files_are_processed_in_order() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.yaml");
    fs::write(&first, r#"{"v": 1}"#)?;
    fs::write(&second, "v: 2\n")?;

    jsq()?
        .arg("v")
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout("1\n2\n");
    Ok(())
}

#[test]
fn table_output() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-o", "table"])
        .write_stdin(r#"[{"a": 1}, {"a": 2}]"#)
        .assert()
        .success()
        .stdout("╔═══╗\n║ a ║\n╟───╢\n║ 1 ║\n║ 2 ║\n╚═══╝\n");
    Ok(())
}

#[test]
fn csv_output_uses_the_inner_format() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-o", "csv", "--inner-format", "json"])
        .write_stdin(r#"{"x": {"y": 1}}"#)
        .assert()
        .success()
        .stdout("key,value\n\"\"\"x\"\"\",\"{\"\"y\"\":1}\"\n");
    Ok(())
}

#[test]
fn yaml_output() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-o", "yaml"])
        .write_stdin(r#"{"name": "jsq"}"#)
        .assert()
        .success()
        .stdout("name: jsq\n");
    Ok(())
}

#[test]
fn take_zero_prints_an_empty_array() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["--take", "0", "-o", "json"])
        .write_stdin("[1, 2, 3]")
        .assert()
        .success()
        .stdout("[]\n");
    Ok(())
}

#[test]
fn as_array_then_to_stream() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-i", "lines", "--as", "array", "--to", "stream", "_.reverse($)"])
        .write_stdin("a\nb\nc\n")
        .assert()
        .success()
        .stdout("c\nb\na\n");
    Ok(())
}

#[test]
fn custom_delimiter_between_items() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-i", "lines", "-d", ","])
        .write_stdin("a\nb\n")
        .assert()
        .success()
        .stdout("a,b,");
    Ok(())
}

#[test]
fn syntax_errors_show_a_caret() -> Result<(), Box<dyn Error>> {
    jsq()?
        .arg("$.map(")
        .write_stdin("[]")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Syntax Error: "))
        .stderr(predicate::str::contains("\n$.map(\n"))
        .stderr(predicate::str::contains("^"));
    Ok(())
}

#[test]
fn unknown_formats_are_reported() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["-o", "xml"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr("Error: Unknown output format: xml\n");
    jsq()?
        .args(["-i", "toml"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown input format: toml"));
    Ok(())
}

#[test]
fn invalid_take_is_rejected() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["--take", "-1"])
        .write_stdin("[]")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value for --take"));
    Ok(())
}

#[test]
fn runtime_errors_exit_with_one() -> Result<(), Box<dyn Error>> {
    jsq()?
        .arg("throw \"nope\"")
        .write_stdin("1")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: ").and(predicate::str::contains("nope")));
    Ok(())
}

#[test]
fn debug_mode_prints_details() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["--debug", "--take", "1"])
        .write_stdin(r#"{"a": 1}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported("));
    Ok(())
}

#[test]
fn missing_files_name_the_path() -> Result<(), Box<dyn Error>> {
    jsq()?
        .args(["$", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.json"));
    Ok(())
}
