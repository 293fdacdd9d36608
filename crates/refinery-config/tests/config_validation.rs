// crates/refinery-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Tests for TOML loading and fail-closed validation.
// ============================================================================
//! ## Overview
//! Validates defaults, the only-true atomic mode, and every rejection arm.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write;

use refinery_config::AdapterConfig;
use refinery_config::ConfigError;

/// Minimal well-formed configuration text.
const MINIMAL: &str = r#"
[runner]
host = "127.0.0.1"
model_file = "model.txs"
input_channel = "Action"
output_channel = "Response"
"#;

/// Tests that the engine section defaults when omitted.
#[test]
fn test_engine_defaults() {
    let config = AdapterConfig::parse(MINIMAL).unwrap();
    assert!(config.engine.atomic_refinement);
    assert!(!config.engine.log_console_to_trace);
    assert_eq!(config.engine.seed, None);
}

/// Tests a fully specified configuration.
#[test]
fn test_full_config() {
    let text = r#"
[engine]
atomic_refinement = true
log_console_to_trace = true
seed = 42

[runner]
host = "runner.internal"
model_file = "specs/login.txs"
input_channel = "Action"
output_channel = "Response"
"#;
    let config = AdapterConfig::parse(text).unwrap();
    assert!(config.engine.log_console_to_trace);
    assert_eq!(config.engine.seed, Some(42));
    assert_eq!(config.runner.host, "runner.internal");
}

/// Tests that disabling atomic refinement fails closed.
#[test]
fn test_atomic_refinement_only_true() {
    let text = r#"
[engine]
atomic_refinement = false

[runner]
host = "127.0.0.1"
model_file = "model.txs"
input_channel = "Action"
output_channel = "Response"
"#;
    assert_eq!(AdapterConfig::parse(text).unwrap_err(), ConfigError::UnsupportedMode);
}

/// Tests the empty-field rejection arms.
#[test]
fn test_empty_fields_rejected() {
    let empty_host = MINIMAL.replace(r#"host = "127.0.0.1""#, r#"host = "  ""#);
    assert_eq!(AdapterConfig::parse(&empty_host).unwrap_err(), ConfigError::EmptyHost);

    let empty_input = MINIMAL.replace(r#"input_channel = "Action""#, r#"input_channel = """#);
    assert_eq!(AdapterConfig::parse(&empty_input).unwrap_err(), ConfigError::EmptyChannel("input"));

    let empty_output = MINIMAL.replace(r#"output_channel = "Response""#, r#"output_channel = """#);
    assert_eq!(
        AdapterConfig::parse(&empty_output).unwrap_err(),
        ConfigError::EmptyChannel("output")
    );

    let empty_model = MINIMAL.replace(r#"model_file = "model.txs""#, r#"model_file = """#);
    assert_eq!(AdapterConfig::parse(&empty_model).unwrap_err(), ConfigError::MissingModelFile);
}

/// Tests that identical channel names are rejected.
#[test]
fn test_indistinct_channels_rejected() {
    let text = MINIMAL.replace(r#"output_channel = "Response""#, r#"output_channel = "Action""#);
    assert_eq!(AdapterConfig::parse(&text).unwrap_err(), ConfigError::IndistinctChannels);
}

/// Tests that unknown fields fail parsing.
#[test]
fn test_unknown_fields_rejected() {
    let text = format!("{MINIMAL}\nsurprise = 1\n");
    assert!(matches!(AdapterConfig::parse(&text), Err(ConfigError::Parse(_))));
}

/// Tests loading from disk, including the missing-file arm.
#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refinery.toml");
    std::fs::write(&path, MINIMAL).unwrap();

    let config = AdapterConfig::load(&path).unwrap();
    assert_eq!(config.runner.input_channel, "Action");

    let missing = dir.path().join("absent.toml");
    assert!(matches!(AdapterConfig::load(&missing), Err(ConfigError::Io(_))));
}

/// Tests that oversized configuration files are rejected before parsing.
#[test]
fn test_oversized_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    let filler =
        vec![b'#'; usize::try_from(refinery_config::MAX_CONFIG_FILE_SIZE + 1).unwrap()];
    file.write_all(&filler).unwrap();
    drop(file);

    assert!(matches!(AdapterConfig::load(&path), Err(ConfigError::TooLarge { .. })));
}
