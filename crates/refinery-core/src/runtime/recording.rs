// crates/refinery-core/src/runtime/recording.rs
// ============================================================================
// Module: Action Refinery Recording Seams
// Description: In-memory output sink and command executor for tests and demos.
// Purpose: Capture deliveries deterministically without external transports.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of the delivery seams for
//! tests and local demos. They record every delivery in arrival order and are
//! not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::ModelAction;
use crate::core::SystemAction;
use crate::interfaces::CommandExecutor;
use crate::interfaces::DeliveryError;
use crate::interfaces::ModelOutputSink;

// ============================================================================
// SECTION: Recording Output Sink
// ============================================================================

/// In-memory model output sink recording deliveries in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingOutputSink {
    /// Recorded outputs protected by a mutex.
    outputs: Arc<Mutex<Vec<ModelAction>>>,
}

impl RecordingOutputSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded outputs.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ModelAction> {
        self.outputs.lock().map_or_else(|_| Vec::new(), |guard| guard.clone())
    }

    /// Drains and returns the recorded outputs.
    #[must_use]
    pub fn take(&self) -> Vec<ModelAction> {
        self.outputs.lock().map_or_else(|_| Vec::new(), |mut guard| std::mem::take(&mut *guard))
    }
}

impl ModelOutputSink for RecordingOutputSink {
    fn deliver(&self, output: &ModelAction) -> Result<(), DeliveryError> {
        self.outputs
            .lock()
            .map_err(|_| DeliveryError::Output("recording sink mutex poisoned".to_string()))?
            .push(output.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Recording Command Executor
// ============================================================================

/// In-memory command executor recording executions in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingExecutor {
    /// Recorded commands protected by a mutex.
    commands: Arc<Mutex<Vec<SystemAction>>>,
}

impl RecordingExecutor {
    /// Creates an empty recording executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded commands.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SystemAction> {
        self.commands.lock().map_or_else(|_| Vec::new(), |guard| guard.clone())
    }

    /// Drains and returns the recorded commands.
    #[must_use]
    pub fn take(&self) -> Vec<SystemAction> {
        self.commands.lock().map_or_else(|_| Vec::new(), |mut guard| std::mem::take(&mut *guard))
    }
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&self, command: &SystemAction) -> Result<(), DeliveryError> {
        self.commands
            .lock()
            .map_err(|_| DeliveryError::Command("recording executor mutex poisoned".to_string()))?
            .push(command.clone());
        Ok(())
    }
}
