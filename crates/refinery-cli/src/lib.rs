// crates/refinery-cli/src/lib.rs
// ============================================================================
// Module: Action Refinery CLI Library
// Description: Command implementations for the refinery CLI.
// Purpose: Keep command logic testable behind the thin binary entry point.
// Dependencies: refinery-config, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The CLI offers two diagnostic commands around adapter deployment: config
//! validation and model channel inspection. Both return rendered JSON so the
//! binary entry point only parses arguments and prints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use refinery_config::AdapterConfig;
use refinery_config::ConfigError;
use refinery_config::ModelError;
use refinery_config::parse_model_channels;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Errors
// ============================================================================

/// Errors raised by CLI commands.
///
/// # Invariants
/// - Variants are stable for exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Model file parsing failed.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Model file could not be read.
    #[error("model file io error: {0}")]
    Io(String),
    /// Output rendering failed.
    #[error("output rendering failed: {0}")]
    Render(String),
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Validates an adapter configuration file and renders a summary.
///
/// # Errors
///
/// Returns [`CliError::Config`] when loading or validation fails.
pub fn run_validate(config_path: &Path) -> Result<String, CliError> {
    let config = AdapterConfig::load(config_path)?;
    let summary = json!({
        "status": "ok",
        "host": config.runner.host,
        "model_file": config.runner.model_file,
        "input_channel": config.runner.input_channel,
        "output_channel": config.runner.output_channel,
        "atomic_refinement": config.engine.atomic_refinement,
        "log_console_to_trace": config.engine.log_console_to_trace,
        "seed": config.engine.seed,
    });
    serde_json::to_string_pretty(&summary).map_err(|err| CliError::Render(err.to_string()))
}

/// Inspects a model file and renders its channel bindings.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the file cannot be read and
/// [`CliError::Model`] when the `CLIENTSOCK` block is missing or malformed.
pub fn run_inspect(model_path: &Path) -> Result<String, CliError> {
    let text = fs::read_to_string(model_path).map_err(|err| CliError::Io(err.to_string()))?;
    let pairs = parse_model_channels(&text)?;
    serde_json::to_string_pretty(&pairs).map_err(|err| CliError::Render(err.to_string()))
}
