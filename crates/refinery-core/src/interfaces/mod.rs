// crates/refinery-core/src/interfaces/mod.rs
// ============================================================================
// Module: Action Refinery Interfaces
// Description: Backend-agnostic seams for output delivery and command execution.
// Purpose: Define the contract surfaces the scheduler dispatches through.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the engine delivers model outputs toward the runner
//! transport and system commands toward the SUT without embedding transport
//! details. Both seams are invoked synchronously from inside the dispatch
//! loop while the scheduler lock is held: implementations must return
//! promptly and must not call back into the scheduler's mutating surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::ModelAction;
use crate::core::SystemAction;

// ============================================================================
// SECTION: Delivery Errors
// ============================================================================

/// Errors raised by delivery seams.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Model output delivery toward the runner failed.
    #[error("model output delivery failed: {0}")]
    Output(String),
    /// System command execution against the SUT failed.
    #[error("system command execution failed: {0}")]
    Command(String),
}

// ============================================================================
// SECTION: Model Output Sink
// ============================================================================

/// Delivers model outputs toward the runner transport.
pub trait ModelOutputSink: Send + Sync {
    /// Delivers one model output.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the transport rejects the output.
    fn deliver(&self, output: &ModelAction) -> Result<(), DeliveryError>;
}

impl<T: ModelOutputSink + ?Sized> ModelOutputSink for Arc<T> {
    fn deliver(&self, output: &ModelAction) -> Result<(), DeliveryError> {
        self.as_ref().deliver(output)
    }
}

// ============================================================================
// SECTION: System Command Executor
// ============================================================================

/// Executes system commands against the SUT.
pub trait CommandExecutor: Send + Sync {
    /// Executes one system command.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the embedder rejects the command.
    fn execute(&self, command: &SystemAction) -> Result<(), DeliveryError>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for Arc<T> {
    fn execute(&self, command: &SystemAction) -> Result<(), DeliveryError> {
        self.as_ref().execute(command)
    }
}
