// crates/refinery-core/src/lib.rs
// ============================================================================
// Module: Action Refinery Core Library
// Description: Public API surface for the Action Refinery core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime, trace}
// ============================================================================

//! ## Overview
//! Action Refinery core provides the action-refinement engine mediating
//! between a model-based test runner and a system under test: symbolic
//! machines with typed local variables and guarded transitions, and a
//! single-lock fixed-point scheduler enforcing atomic refinement. It is
//! transport-agnostic and integrates through explicit interfaces rather than
//! embedding into a runner or SUT harness.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod trace;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CommandExecutor;
pub use interfaces::DeliveryError;
pub use interfaces::ModelOutputSink;
pub use runtime::FilterIndex;
pub use runtime::MachineBuilder;
pub use runtime::MachineError;
pub use runtime::MachineSnapshot;
pub use runtime::RecordingExecutor;
pub use runtime::RecordingOutputSink;
pub use runtime::RefinementScheduler;
pub use runtime::SchedulerBuilder;
pub use runtime::SchedulerError;
pub use runtime::SymbolicMachine;
pub use runtime::TickSummary;
pub use trace::NullTraceSink;
pub use trace::TraceEvent;
pub use trace::TraceSink;
pub use trace::WriterTraceSink;
