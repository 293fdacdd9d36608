// crates/refinery-config/src/config.rs
// ============================================================================
// Module: Action Refinery Configuration
// Description: Configuration loading and validation for the adapter.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits and
//! unknown-field denial. Missing or invalid configuration fails closed:
//! atomic refinement is the only supported scheduling mode and a config that
//! disables it is rejected at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "refinery.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "REFINERY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// ============================================================================
// SECTION: Config Errors
// ============================================================================

/// Errors raised by configuration loading and validation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Configuration file exceeds the size limit.
    #[error("config file is {actual} bytes, limit is {limit}")]
    TooLarge {
        /// Permitted maximum size in bytes.
        limit: u64,
        /// Observed file size in bytes.
        actual: u64,
    },
    /// Configuration file failed to parse.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Atomic refinement was disabled; it is the only supported mode.
    #[error("atomic_refinement = false is not supported")]
    UnsupportedMode,
    /// Runner host is empty.
    #[error("runner host is empty")]
    EmptyHost,
    /// A channel name is empty.
    #[error("runner {0} channel is empty")]
    EmptyChannel(&'static str),
    /// Input and output channels share one name.
    #[error("runner input and output channels must differ")]
    IndistinctChannels,
    /// Model file path is empty.
    #[error("runner model file path is empty")]
    MissingModelFile,
}

// ============================================================================
// SECTION: Engine Section
// ============================================================================

/// Engine options recognized by the scheduler wiring.
///
/// # Invariants
/// - `atomic_refinement` defaults to true and only true validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Atomic refinement flag; the only supported value is `true`.
    #[serde(default = "default_true")]
    pub atomic_refinement: bool,
    /// Routes trace records to standard output when set.
    #[serde(default)]
    pub log_console_to_trace: bool,
    /// Optional deterministic seed for candidate selection.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            atomic_refinement: true,
            log_console_to_trace: false,
            seed: None,
        }
    }
}

// ============================================================================
// SECTION: Runner Section
// ============================================================================

/// Runner link options.
///
/// # Invariants
/// - Host, channels, and the model file path are non-empty after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Runner host name or address.
    pub host: String,
    /// Path of the plain-text model file declaring channel bindings.
    pub model_file: PathBuf,
    /// Designated model input channel (runner to engine).
    pub input_channel: String,
    /// Designated model output channel (engine to runner).
    pub output_channel: String,
}

// ============================================================================
// SECTION: Adapter Config
// ============================================================================

/// Top-level adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Engine options.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Runner link options.
    pub runner: RunnerConfig,
}

impl AdapterConfig {
    /// Loads and validates configuration from the provided path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O failure, oversized files, parse
    /// failure, or validation failure.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                limit: MAX_CONFIG_FILE_SIZE,
                actual: metadata.len(),
            });
        }
        let text = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::parse(&text)
    }

    /// Loads configuration from the environment override or the default name.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from [`Self::load`].
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_ENV_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from);
        Self::load(&path)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and validation
    /// errors for out-of-contract values.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration, failing closed on unsupported values.
    ///
    /// # Errors
    ///
    /// Returns the first violated [`ConfigError`] arm.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.engine.atomic_refinement {
            return Err(ConfigError::UnsupportedMode);
        }
        if self.runner.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.runner.input_channel.trim().is_empty() {
            return Err(ConfigError::EmptyChannel("input"));
        }
        if self.runner.output_channel.trim().is_empty() {
            return Err(ConfigError::EmptyChannel("output"));
        }
        if self.runner.input_channel == self.runner.output_channel {
            return Err(ConfigError::IndistinctChannels);
        }
        if self.runner.model_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingModelFile);
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Serde Defaults
// ============================================================================

/// Serde default helper returning `true`.
const fn default_true() -> bool {
    true
}
