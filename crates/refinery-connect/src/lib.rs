// crates/refinery-connect/src/lib.rs
// ============================================================================
// Module: Action Refinery Connect Library
// Description: Runner transport, SUT executors, and the adapter facade.
// Purpose: Bind the refinement engine to a live runner link and a SUT.
// Dependencies: refinery-core, serde, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! Action Refinery Connect implements the transport boundary around the core
//! engine: a line-oriented TCP connector to the test runner, a family of
//! system command executors toward the SUT, and the [`Adapter`] facade that
//! wires both to a refinement scheduler.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod connector;
pub mod executor;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::Adapter;
pub use adapter::AdapterBuilder;
pub use adapter::AdapterError;
pub use connector::ConnectorError;
pub use connector::RunnerConnector;
pub use connector::RunnerConnectorBuilder;
pub use executor::CallbackExecutor;
pub use executor::ChannelExecutor;
pub use executor::LogExecutor;
pub use wire::ChannelBinding;
pub use wire::TorxAction;
pub use wire::WireDirection;
pub use wire::decode_line;
pub use wire::encode_line;
