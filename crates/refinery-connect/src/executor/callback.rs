// crates/refinery-connect/src/executor/callback.rs
// ============================================================================
// Module: Action Refinery Callback Executor
// Description: Callback-based executor for synchronous SUT delivery.
// Purpose: Invoke a user-provided function with each system command.
// Dependencies: refinery-core, std
// ============================================================================

//! ## Overview
//! [`CallbackExecutor`] delivers commands by invoking a user-supplied
//! function synchronously from the dispatch loop. The handler must not call
//! back into the scheduler's mutating surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use refinery_core::CommandExecutor;
use refinery_core::DeliveryError;
use refinery_core::SystemAction;

// ============================================================================
// SECTION: Callback Executor
// ============================================================================

/// Callback-based system command executor.
#[derive(Clone)]
pub struct CallbackExecutor {
    /// Handler invoked with each command.
    handler: Arc<CallbackHandler>,
}

/// Callback handler signature used by the executor.
type CallbackHandler = dyn Fn(&SystemAction) -> Result<(), DeliveryError> + Send + Sync;

impl CallbackExecutor {
    /// Creates a callback executor from a handler function.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&SystemAction) -> Result<(), DeliveryError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl CommandExecutor for CallbackExecutor {
    fn execute(&self, command: &SystemAction) -> Result<(), DeliveryError> {
        (self.handler)(command)
    }
}
