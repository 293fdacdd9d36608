// crates/refinery-connect/src/executor/log.rs
// ============================================================================
// Module: Action Refinery Log Executor
// Description: Log-only executor for audit-grade command records.
// Purpose: Persist command records without driving a SUT.
// Dependencies: refinery-core, serde_json, std
// ============================================================================

//! ## Overview
//! `LogExecutor` writes a JSON record for each command and performs no other
//! delivery. It suits dry runs and refinement debugging where the SUT is
//! absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use refinery_core::CommandExecutor;
use refinery_core::DeliveryError;
use refinery_core::SystemAction;
use serde_json::json;

// ============================================================================
// SECTION: Log Executor
// ============================================================================

/// Log-only system command executor.
pub struct LogExecutor<W: Write + Send> {
    /// Output writer for command records.
    writer: Mutex<W>,
}

impl<W: Write + Send> LogExecutor<W> {
    /// Creates a log executor over the provided writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> CommandExecutor for LogExecutor<W> {
    fn execute(&self, command: &SystemAction) -> Result<(), DeliveryError> {
        let record = json!({
            "kind": command.kind,
            "payload": command.payload,
        });
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| DeliveryError::Command("log writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, &record)
            .map_err(|err| DeliveryError::Command(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| DeliveryError::Command(err.to_string()))
    }
}
