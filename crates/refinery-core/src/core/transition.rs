// crates/refinery-core/src/core/transition.rs
// ============================================================================
// Module: Action Refinery Transitions
// Description: Guarded state-machine edges in reactive and proactive flavors.
// Purpose: Carry guards, updates, and generators as first-class callables.
// Dependencies: crate::core::{action, identifiers, variables}, thiserror
// ============================================================================

//! ## Overview
//! A transition is an edge between two states keyed on one action kind. The
//! reactive flavor consumes an incoming action; the proactive flavor produces
//! one. Guards, updates, and generators are opaque callables over the owning
//! machine's variable store; any of them may fail, and the failure propagates
//! out of the dispatch loop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::action::Action;
use crate::core::action::ActionClass;
use crate::core::action::ActionDomain;
use crate::core::identifiers::ActionKind;
use crate::core::identifiers::StateId;
use crate::core::variables::VariableError;
use crate::core::variables::VariableStore;

// ============================================================================
// SECTION: Hook Errors
// ============================================================================

/// Failure raised inside a guard, update, or generator hook.
///
/// # Invariants
/// - The message is stable enough for diagnostics only; hooks are opaque.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("refinement hook failure: {0}")]
pub struct HookError(String);

impl HookError {
    /// Creates a hook error with the provided message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<VariableError> for HookError {
    fn from(err: VariableError) -> Self {
        Self(err.to_string())
    }
}

// ============================================================================
// SECTION: Hook Signatures
// ============================================================================

/// Guard over the variable store and an incoming action.
pub type ReactiveGuardFn = dyn Fn(&VariableStore, &Action) -> Result<bool, HookError> + Send + Sync;

/// Guard over the variable store alone.
pub type ProactiveGuardFn = dyn Fn(&VariableStore) -> Result<bool, HookError> + Send + Sync;

/// Update over the variable store and the triggering or generated action.
pub type UpdateFn = dyn Fn(&mut VariableStore, &Action) -> Result<(), HookError> + Send + Sync;

/// Generator producing the outgoing action from the variable store.
pub type GenerateFn = dyn Fn(&VariableStore) -> Result<Action, HookError> + Send + Sync;

// ============================================================================
// SECTION: Transition Behavior
// ============================================================================

/// Flavor-specific hooks of a transition.
#[derive(Clone)]
pub enum Behavior {
    /// Consumes an incoming action matching the keyed kind.
    Reactive {
        /// Guard over store and incoming action.
        guard: Arc<ReactiveGuardFn>,
        /// Update applied when the transition fires.
        update: Arc<UpdateFn>,
    },
    /// Produces an outgoing action of the keyed kind.
    Proactive {
        /// Guard over the store alone.
        guard: Arc<ProactiveGuardFn>,
        /// Update applied after generation, observing the generated action.
        update: Arc<UpdateFn>,
        /// Generator for the outgoing action.
        generate: Arc<GenerateFn>,
    },
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reactive { .. } => f.debug_struct("Reactive").finish_non_exhaustive(),
            Self::Proactive { .. } => f.debug_struct("Proactive").finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// SECTION: Transition
// ============================================================================

/// Guarded edge between two states, keyed on one action kind.
///
/// # Invariants
/// - `from` and `to` must be declared states of the owning machine.
#[derive(Clone, Debug)]
pub struct Transition {
    /// Source state.
    pub from: StateId,
    /// Target state.
    pub to: StateId,
    /// Action kind this transition is keyed on.
    pub kind: ActionKind,
    /// Vocabulary of the keyed kind.
    pub domain: ActionDomain,
    /// Flavor-specific hooks.
    pub behavior: Behavior,
}

impl Transition {
    /// Creates a reactive transition consuming the keyed action kind.
    pub fn reactive<G, U>(
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        kind: impl Into<ActionKind>,
        domain: ActionDomain,
        guard: G,
        update: U,
    ) -> Self
    where
        G: Fn(&VariableStore, &Action) -> Result<bool, HookError> + Send + Sync + 'static,
        U: Fn(&mut VariableStore, &Action) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: to.into(),
            kind: kind.into(),
            domain,
            behavior: Behavior::Reactive {
                guard: Arc::new(guard),
                update: Arc::new(update),
            },
        }
    }

    /// Creates a proactive transition producing the keyed action kind.
    pub fn proactive<G, U, P>(
        from: impl Into<StateId>,
        to: impl Into<StateId>,
        kind: impl Into<ActionKind>,
        domain: ActionDomain,
        guard: G,
        update: U,
        generate: P,
    ) -> Self
    where
        G: Fn(&VariableStore) -> Result<bool, HookError> + Send + Sync + 'static,
        U: Fn(&mut VariableStore, &Action) -> Result<(), HookError> + Send + Sync + 'static,
        P: Fn(&VariableStore) -> Result<Action, HookError> + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: to.into(),
            kind: kind.into(),
            domain,
            behavior: Behavior::Proactive {
                guard: Arc::new(guard),
                update: Arc::new(update),
                generate: Arc::new(generate),
            },
        }
    }

    /// Returns true for the proactive flavor.
    #[must_use]
    pub const fn is_proactive(&self) -> bool {
        matches!(self.behavior, Behavior::Proactive { .. })
    }

    /// Returns the filter classification of this transition.
    #[must_use]
    pub const fn class(&self) -> ActionClass {
        match (&self.behavior, self.domain) {
            (Behavior::Reactive { .. }, ActionDomain::Model) => ActionClass::ModelInput,
            (Behavior::Proactive { .. }, ActionDomain::Model) => ActionClass::ModelOutput,
            (Behavior::Reactive { .. }, ActionDomain::System) => ActionClass::SystemEvent,
            (Behavior::Proactive { .. }, ActionDomain::System) => ActionClass::SystemCommand,
        }
    }
}
