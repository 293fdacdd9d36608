// crates/refinery-cli/src/main.rs
// ============================================================================
// Module: Action Refinery CLI Entry Point
// Description: Command dispatcher for adapter diagnostics.
// Purpose: Provide config validation and model inspection from the shell.
// Dependencies: clap, refinery-cli
// ============================================================================

//! ## Overview
//! The refinery binary wraps the diagnostic commands of the CLI library:
//! `validate` checks an adapter configuration, `inspect` lists the channel
//! bindings a model file declares. Failures render on standard error and map
//! to a non-zero exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use refinery_cli::CliError;
use refinery_cli::run_inspect;
use refinery_cli::run_validate;

// ============================================================================
// SECTION: Argument Model
// ============================================================================

/// Top-level CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "refinery", about = "Action Refinery adapter diagnostics")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Validate an adapter configuration file.
    Validate(ValidateArgs),
    /// Inspect the channel bindings declared by a model file.
    Inspect(InspectArgs),
}

/// Arguments for `validate`.
#[derive(Debug, Args)]
struct ValidateArgs {
    /// Path of the adapter configuration file.
    #[arg(long)]
    config: PathBuf,
}

/// Arguments for `inspect`.
#[derive(Debug, Args)]
struct InspectArgs {
    /// Path of the plain-text model file.
    #[arg(long)]
    model: PathBuf,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Binary entry point mapping command results onto exit codes.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(output) => {
            emit(&output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            emit_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the selected subcommand.
fn run(command: &Command) -> Result<String, CliError> {
    match command {
        Command::Validate(args) => run_validate(&args.config),
        Command::Inspect(args) => run_inspect(&args.model),
    }
}

/// Writes one line of command output.
#[allow(clippy::print_stdout, reason = "CLI output surface")]
fn emit(line: &str) {
    println!("{line}");
}

/// Writes one line of error output.
#[allow(clippy::print_stderr, reason = "CLI error surface")]
fn emit_error(line: &str) {
    eprintln!("error: {line}");
}
