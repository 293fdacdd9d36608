// crates/refinery-connect/src/executor/mod.rs
// ============================================================================
// Module: Action Refinery SUT Executors
// Description: Command executor implementations for SUT delivery.
// Purpose: Deliver system commands to concrete embedder targets.
// Dependencies: refinery-core
// ============================================================================

//! ## Overview
//! Executors implement [`refinery_core::CommandExecutor`] for the common
//! embedder shapes: a synchronous callback, a Tokio mpsc channel, and a
//! JSON-line log for audit-style runs. All of them are invoked from inside
//! the scheduler's dispatch loop and must return promptly; an embedder whose
//! command handling may block is responsible for offloading.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod callback;
pub mod channel;
pub mod log;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callback::CallbackExecutor;
pub use channel::ChannelExecutor;
pub use log::LogExecutor;
