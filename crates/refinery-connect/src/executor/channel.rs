// crates/refinery-connect/src/executor/channel.rs
// ============================================================================
// Module: Action Refinery Channel Executor
// Description: Channel-based executor for asynchronous SUT delivery.
// Purpose: Send system commands through a Tokio mpsc channel.
// Dependencies: refinery-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelExecutor`] delivers commands by sending them into a
//! `tokio::sync::mpsc` channel. Delivery fails closed when the channel is
//! full or closed, so a stalled consumer surfaces as a dispatch error instead
//! of silent loss.

// ============================================================================
// SECTION: Imports
// ============================================================================

use refinery_core::CommandExecutor;
use refinery_core::DeliveryError;
use refinery_core::SystemAction;
use tokio::sync::mpsc::Sender;

// ============================================================================
// SECTION: Channel Executor
// ============================================================================

/// Channel-based system command executor.
///
/// # Invariants
/// - Each successful delivery enqueues exactly one command.
#[derive(Debug, Clone)]
pub struct ChannelExecutor {
    /// Sender used to enqueue commands.
    sender: Sender<SystemAction>,
}

impl ChannelExecutor {
    /// Creates a channel executor over the provided sender.
    #[must_use]
    pub const fn new(sender: Sender<SystemAction>) -> Self {
        Self {
            sender,
        }
    }
}

impl CommandExecutor for ChannelExecutor {
    fn execute(&self, command: &SystemAction) -> Result<(), DeliveryError> {
        self.sender
            .try_send(command.clone())
            .map_err(|err| DeliveryError::Command(err.to_string()))
    }
}
