//! jsq CLI - transform structured data with script expressions
//!
//! Reads JSON, NDJSON, text lines, CSV or YAML from files or stdin,
//! evaluates an expression against the input (per item for streams) and
//! prints the result as raw text, JSON, YAML, an inspect dump, CSV or a
//! table.

use clap::{Parser, ValueEnum};
use jsq_expr::normalize_expression;
use jsq_format::{JsqError, Result};
use jsq_io::{
    execute, parse_take, EvalOptions, ExecuteRequest, InputFormat, InputOptions, OutputFormat,
    Program, RenderOptions, Shape,
};
use serde_json::Value;
use std::error::Error as _;
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXPRESSION_HELP: &str = "\
Expression:
  A Rhai expression evaluated against the input. For streamed input
  (ndjson, lines, csv) it runs once per item, otherwise once on the whole
  document. The current value is '$'; keys of the current object are also
  available as bare names. '_' holds the utility functions (_.map($, f),
  _.group_by($, \"key\"), ...), 'fp' the same functions data-last and curried
  (fp.map(f)), and '$$' wraps the value for chaining ($$.map(f).value()).
  A function result is applied to the current value. '.' means '$'.

Examples:
  jsq -i ndjson -o json '_.map($, \"name\")' data.ndjson
  jsq -i csv -o table 'fp.filter(|r| parse_int(r.age) > 30)' < data.csv
  jsq -i yaml -o yaml '$.users[0]' < data.yaml";

#[derive(Parser, Debug)]
#[command(name = "jsq")]
#[command(about = "Transform JSON, NDJSON, CSV and YAML with script expressions")]
#[command(version)]
#[command(after_help = EXPRESSION_HELP)]
struct Cli {
    /// Expression to evaluate ('.' or absent for the input itself)
    expression: Option<String>,
    /// Input files ('-' or none for stdin)
    files: Vec<PathBuf>,
    /// Input format (json, ndjson, lines, csv, yaml) [default: from extension, else json]
    #[arg(short, long)]
    input_format: Option<String>,
    /// Output format (raw, json, yaml, inspect, csv, table)
    #[arg(short, long, default_value = "raw")]
    output_format: String,
    /// Cell format for csv and table output
    #[arg(long, default_value = "raw")]
    inner_format: String,
    /// Decoder options as a JSON object
    #[arg(long)]
    input_options: Option<String>,
    /// Renderer options as a JSON object
    #[arg(long)]
    output_options: Option<String>,
    /// Indentation for structured output
    #[arg(long, default_value_t = 2)]
    indent: usize,
    /// Separator written after each streamed item
    #[arg(short, long)]
    delimiter: Option<String>,
    /// Only take the first N input items
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    take: Option<String>,
    /// Treat the input as a stream or an array
    #[arg(long = "as", value_name = "stream|array")]
    as_shape: Option<String>,
    /// Emit the result as a stream or an array
    #[arg(long = "to", value_name = "stream|array")]
    to_shape: Option<String>,
    /// Colorize output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
    /// Print full error details (also enabled by the DEBUG variable)
    #[arg(long)]
    debug: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    let debug = cli.debug || std::env::var_os("DEBUG").is_some();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_broken_pipe() => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, debug);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("JSQ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn report(err: &JsqError, debug: bool) {
    if let JsqError::Compile(compile) = err {
        eprintln!("{compile}");
        return;
    }
    if debug {
        eprintln!("Error: {err:?}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    } else {
        eprintln!("Error: {err}");
    }
}

fn run(cli: &Cli) -> Result<()> {
    let output_format: OutputFormat = cli.output_format.parse()?;
    let explicit_input = cli
        .input_format
        .as_deref()
        .map(str::parse::<InputFormat>)
        .transpose()?;
    let input_options = InputOptions::from_json(json_option(
        cli.input_options.as_deref(),
        "--input-options",
    )?)?;
    let render = render_options(cli)?;
    let eval = eval_options(cli)?;

    let program = Rc::new(Program::compile(normalize_expression(
        cli.expression.as_deref(),
    ))?);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let files = if cli.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        cli.files.clone()
    };
    for file in &files {
        let input_format = explicit_input
            .or_else(|| InputFormat::from_extension(file))
            .unwrap_or(InputFormat::Json);
        debug!(file = %file.display(), %input_format, "processing input");

        let request = ExecuteRequest {
            input_format,
            input_options: input_options.clone(),
            eval: eval.clone(),
            output_format,
            render: render.clone(),
        };
        execute(Rc::clone(&program), open_input(file)?, &mut out, &request)?;
    }
    Ok(())
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path).map_err(|err| {
        JsqError::Io(io::Error::new(err.kind(), format!("{}: {err}", path.display())))
    })?;
    Ok(Box::new(file))
}

fn json_option(text: Option<&str>, flag: &str) -> Result<Value> {
    match text {
        None => Ok(Value::Null),
        Some(text) => serde_json::from_str(text)
            .map_err(|err| JsqError::InvalidArgument(format!("{flag}: {err}"))),
    }
}

fn render_options(cli: &Cli) -> Result<RenderOptions> {
    let mut render = RenderOptions {
        indent: cli.indent,
        inner_format: cli.inner_format.parse()?,
        color: color_enabled(cli.color, io::stdout().is_terminal()),
        ..RenderOptions::default()
    };
    if let Some(delimiter) = &cli.delimiter {
        render.delimiter = delimiter.clone();
    }
    render.apply_overrides(json_option(cli.output_options.as_deref(), "--output-options")?)?;
    colored::control::set_override(render.color);
    Ok(render)
}

fn eval_options(cli: &Cli) -> Result<EvalOptions> {
    Ok(EvalOptions {
        take: cli.take.as_deref().map(parse_take).transpose()?,
        input_shape: cli.as_shape.as_deref().map(str::parse::<Shape>).transpose()?,
        output_shape: cli.to_shape.as_deref().map(str::parse::<Shape>).transpose()?,
    })
}

fn color_enabled(choice: ColorChoice, is_terminal: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_terminal,
    }
}
