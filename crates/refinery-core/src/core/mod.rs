// crates/refinery-core/src/core/mod.rs
// ============================================================================
// Module: Action Refinery Core Types
// Description: Canonical action, state, transition, and variable structures.
// Purpose: Provide stable, serializable types for refinement definitions.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types define the action taxonomy exchanged with the runner and the
//! SUT, the textual model-action codec, the typed variable store, and the
//! guarded transitions that make up a symbolic machine. These types are the
//! canonical source of truth for the runtime and any adapter surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod action;
pub mod codec;
pub mod identifiers;
pub mod transition;
pub mod variables;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use action::Action;
pub use action::ActionClass;
pub use action::ActionDomain;
pub use action::FieldType;
pub use action::FieldValue;
pub use action::ModelAction;
pub use action::REFINEMENT_ERROR_INPUT_FIELD;
pub use action::REFINEMENT_ERROR_KIND;
pub use action::SystemAction;
pub use codec::CodecError;
pub use codec::decode_action;
pub use codec::encode_action;
pub use identifiers::ActionKind;
pub use identifiers::MachineId;
pub use identifiers::StateId;
pub use transition::Behavior;
pub use transition::GenerateFn;
pub use transition::HookError;
pub use transition::ProactiveGuardFn;
pub use transition::ReactiveGuardFn;
pub use transition::Transition;
pub use transition::UpdateFn;
pub use variables::VariableError;
pub use variables::VariableStore;
