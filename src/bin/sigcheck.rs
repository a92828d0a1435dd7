//! Signature Checking Tool
//!
//! Compiles signature text and validates JSON argument lists against it from
//! the command line. Useful when writing signatures for new native functions.
//!
//! ## Usage
//! ```bash
//! sigcheck check '<s-nn?:s>'
//! sigcheck validate '<a<n>>' '[[1, 2, 3]]'
//! sigcheck validate '<s-n>' '[5]' --context '"ctx"'
//! ```
//!
//! Log output is controlled by `RUST_LOG` (default `warn`) or `--verbose`.

use std::io::Write;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use signet::{compile, Validator, Value};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

// ============================================================================
// 1. Command-line arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "sigcheck",
    version,
    about = "Compile function signatures and validate argument lists against them."
)]
struct Args {
    /// Log compilation and validation steps.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a signature and print its parameters.
    Check {
        /// Signature text, e.g. '<s-nn?:s>'.
        signature: String,
    },
    /// Validate a JSON array of arguments against a signature.
    Validate {
        /// Signature text, e.g. '<a<n>>'.
        signature: String,
        /// Arguments as a JSON array, e.g. '[[1, 2]]'.
        args: String,
        /// Context value as JSON, used by '-' parameters.
        #[arg(long)]
        context: Option<String>,
    },
}

// ============================================================================
// 2. Entry point
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    match args.command {
        Command::Check { signature } => {
            let validator = compile(&signature)?;
            print_params(&mut stdout, &validator).into_diagnostic()?;
        }
        Command::Validate {
            signature,
            args,
            context,
        } => {
            let validator = compile(&signature)?;
            let args = parse_args(&args)?;
            let context = context.as_deref().map(parse_json).transpose()?;
            let resolved = validator.validate(&args, context.as_ref())?;
            print_resolved(&mut stdout, &resolved).into_diagnostic()?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("signet=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================================================
// 3. Input parsing
// ============================================================================

fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str::<serde_json::Value>(text)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid JSON: {text}"))
        .map(Value::from)
}

fn parse_args(text: &str) -> Result<Vec<Value>> {
    match parse_json(text)? {
        Value::List(items) => Ok(items),
        other => Err(miette::miette!(
            help = "wrap the arguments in a JSON array, e.g. '[1, \"x\"]'",
            "arguments must be a JSON array, got {}",
            other.type_name()
        )),
    }
}

// ============================================================================
// 4. Output
// ============================================================================

fn print_params(out: &mut StandardStream, validator: &Validator) -> std::io::Result<()> {
    heading(out, "signature", validator.definition())?;
    for (i, param) in validator.params().iter().enumerate() {
        let mut line = format!("  {:>2}. {:<6} {:<12}", i + 1, param.kind(), param.pattern());
        if param.is_array() {
            line.push_str(" array");
        }
        if let Some(element) = param.element_kind() {
            line.push_str(&format!(" of {element}"));
        }
        if let Some(context) = param.context_pattern() {
            line.push_str(&format!(" (context {context})"));
        }
        writeln!(out, "{}", line.trim_end())?;
    }
    heading(out, "pattern", validator.pattern())?;
    if let Some(returns) = validator.return_kind() {
        heading(out, "returns", returns)?;
    }
    Ok(())
}

fn print_resolved(out: &mut StandardStream, resolved: &[Value]) -> std::io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(out, "accepted")?;
    out.reset()?;
    writeln!(out)?;
    let json: Vec<String> = resolved
        .iter()
        .map(|value| match value.to_json() {
            Some(json) => json.to_string(),
            None => value.to_string(),
        })
        .collect();
    writeln!(out, "[{}]", json.join(","))
}

fn heading(out: &mut StandardStream, label: &str, text: &str) -> std::io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{label}:")?;
    out.reset()?;
    writeln!(out, " {text}")
}
