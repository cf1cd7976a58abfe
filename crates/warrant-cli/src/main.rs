//! Command-line interface for admissibility evaluation.
//!
//! Reads a request envelope (file or stdin) or a bare utterance, runs the
//! evaluation, and prints the judgment as JSON on stdout. Logs go to
//! stderr so stdout stays machine-readable.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use warrant_core::conversation::validate_request_schema;
use warrant_core::{
    evaluate_from_json_with_options, evaluate_with_options, EvaluateInput, EvaluateOptions,
    LicenseMode,
};

#[derive(Parser)]
#[command(name = "warrant", about = "Normative admissibility evaluation for agent utterances")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a request envelope or a bare utterance
    Evaluate(EvaluateArgs),
}

#[derive(Args)]
#[command(group = ArgGroup::new("source").required(true).args(["input", "agent_output"]))]
struct EvaluateArgs {
    /// Request envelope JSON file, or `-` for stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Evaluate a bare utterance without a trajectory
    #[arg(long)]
    agent_output: Option<String>,

    /// Pretty-print the judgment
    #[arg(long)]
    pretty: bool,

    /// How grounding licenses claims
    #[arg(long, value_enum, default_value_t = LicenseModeArg::Links)]
    license_mode: LicenseModeArg,

    /// Skip the request schema pre-check
    #[arg(long)]
    skip_schema_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LicenseModeArg {
    /// Presence of relevant grounds licenses assertion
    Conservative,
    /// Only cited grounds license assertion
    Links,
}

impl From<LicenseModeArg> for LicenseMode {
    fn from(mode: LicenseModeArg) -> Self {
        match mode {
            LicenseModeArg::Conservative => LicenseMode::Conservative,
            LicenseModeArg::Links => LicenseMode::Links,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Evaluate(args) => run_evaluate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let options = EvaluateOptions {
        license_mode: args.license_mode.into(),
    };

    let judgment = if let Some(path) = &args.input {
        let payload = read_input(path)?;
        if !args.skip_schema_check {
            check_schema(&payload)?;
        }
        evaluate_from_json_with_options(&payload, options)?
    } else {
        let input = EvaluateInput {
            agent_output: args.agent_output.clone(),
            ..Default::default()
        };
        evaluate_with_options(input, options)?
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&judgment)?
    } else {
        serde_json::to_string(&judgment)?
    };
    println!("{rendered}");
    Ok(())
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn check_schema(payload: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(payload).context("request is not valid JSON")?;
    if let Err(violations) = validate_request_schema(&value) {
        for violation in &violations {
            eprintln!("schema: {violation}");
        }
        bail!("request failed schema validation");
    }
    Ok(())
}
