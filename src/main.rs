use std::{fs, path::PathBuf, process};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weft::{
    error::Error,
    interpreter::{compiler::CompileOptions, evaluator::core::InvocationContext, value::core::Value},
};

/// weft evaluates an expression or renders a template against JSON input.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat SOURCE as an interpolation template instead of an expression.
    #[arg(short, long)]
    template: bool,

    /// JSON input the source is evaluated against. Defaults to `null`.
    #[arg(short, long, conflicts_with = "input_file")]
    input: Option<String>,

    /// Read the JSON input from a file.
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// A global available as `$NAME`, given as NAME=JSON. Repeatable.
    #[arg(short, long = "global", value_parser = parse_global)]
    globals: Vec<(String, serde_json::Value)>,

    /// Pretty-print the JSON result of an expression.
    #[arg(short, long)]
    pretty: bool,

    source: String,
}

fn parse_global(arg: &str) -> Result<(String, serde_json::Value), String> {
    let (name, json) = arg.split_once('=')
                          .ok_or_else(|| format!("expected NAME=JSON, got '{arg}'"))?;
    let value = serde_json::from_str(json).map_err(|e| format!("invalid JSON for '{name}': {e}"))?;
    Ok((name.to_string(), value))
}

fn read_input(args: &Args) -> Result<serde_json::Value, String> {
    let text = match (&args.input, &args.input_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path).map_err(|e| {
                                                          format!("Failed to read the input file '{}': {e}",
                                                                  path.display())
                                                      })?,
        (None, None) => return Ok(serde_json::Value::Null),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON input: {e}"))
}

fn run(args: &Args, invocation: &InvocationContext) -> Result<String, Error> {
    let parser = weft::Parser::new();
    let options = CompileOptions { globals: invocation.extra.keys().cloned().collect() };

    if args.template {
        let template = parser.compile_interpolation_with(&args.source, &options)?;
        return Ok(template.render(invocation)?);
    }

    let expr = parser.compile_expression_with(&args.source, &options)?;
    let json = expr.evaluate(invocation)?
                   .map_or(serde_json::Value::Null, |v| v.to_json());
    let text = if args.pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    Ok(text.unwrap_or_default())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
                  .unwrap_or_else(|_| "weft=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let input = read_input(&args).unwrap_or_else(|e| {
                                     eprintln!("{e}");
                                     process::exit(2);
                                 });
    let invocation = args.globals
                         .iter()
                         .fold(InvocationContext::new(Value::from(input)), |ctx, (name, json)| {
                             ctx.with_extra(name.clone(), Value::from(json.clone()))
                         });
    debug!(template = args.template, globals = invocation.extra.len(), "running");

    match run(&args, &invocation) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("{}: {e}", e.kind());
            process::exit(1);
        },
    }
}
