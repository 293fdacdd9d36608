// crates/refinery-core/src/runtime/machine.rs
// ============================================================================
// Module: Action Refinery Symbolic Machine
// Description: IOSTS instance with states, transitions, and owned variables.
// Purpose: Compute enabled transition sets and execute firings.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! A symbolic machine holds a finite state set, a designated initial state, a
//! current state, guarded transitions, and its own variable store. It refines
//! exactly one model-input kind, derived at build time from its reactive
//! model transitions; zero or several kinds reject construction rather than
//! warn, so nothing ill-formed reaches the scheduler. Enabled sets are computed
//! against the current state and guards; firing re-validates enabledness so a
//! stale candidate fails with an illegal-transition error instead of
//! corrupting state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::Action;
use crate::core::ActionClass;
use crate::core::ActionKind;
use crate::core::Behavior;
use crate::core::FieldValue;
use crate::core::HookError;
use crate::core::MachineId;
use crate::core::StateId;
use crate::core::Transition;
use crate::core::VariableError;
use crate::core::VariableStore;

// ============================================================================
// SECTION: Machine Errors
// ============================================================================

/// Errors raised while building or driving a symbolic machine.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum MachineError {
    /// Builder finished without an initial state.
    #[error("machine {machine} has no initial state")]
    MissingInitial {
        /// Machine identifier.
        machine: String,
    },
    /// A transition endpoint or the initial state is not a declared state.
    #[error("state is not declared in machine {machine}: {state}")]
    UnknownState {
        /// Machine identifier.
        machine: String,
        /// Undeclared state name.
        state: String,
    },
    /// No reactive model-input kind appears across the transitions.
    #[error("machine {machine} consumes no model input kind")]
    NoModelKind {
        /// Machine identifier.
        machine: String,
    },
    /// More than one reactive model-input kind appears across the transitions.
    #[error("machine {machine} consumes multiple model input kinds: {kinds:?}")]
    MultipleModelKinds {
        /// Machine identifier.
        machine: String,
        /// Conflicting kind names.
        kinds: Vec<String>,
    },
    /// A seed variable binding failed.
    #[error("machine {machine} seed variable rejected: {source}")]
    SeedVariable {
        /// Machine identifier.
        machine: String,
        /// Underlying variable error.
        source: VariableError,
    },
    /// Firing was requested for a transition outside the enabled set.
    #[error("transition {index} is not enabled in machine {machine}")]
    IllegalTransition {
        /// Machine identifier.
        machine: String,
        /// Index of the rejected transition.
        index: usize,
    },
    /// A guard, update, or generator hook failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}

// ============================================================================
// SECTION: Machine Builder
// ============================================================================

/// Builder for a symbolic machine.
///
/// # Invariants
/// - `build` validates endpoints, the initial state, and the refined kind.
#[derive(Default)]
pub struct MachineBuilder {
    /// Machine identifier.
    name: Option<MachineId>,
    /// Declared state set.
    states: BTreeSet<StateId>,
    /// Designated initial state.
    initial: Option<StateId>,
    /// Declared transitions in insertion order.
    transitions: Vec<Transition>,
    /// Seed variable bindings applied at build time.
    seeds: Vec<(String, FieldValue)>,
}

impl MachineBuilder {
    /// Creates a builder for the named machine.
    #[must_use]
    pub fn new(name: impl Into<MachineId>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Declares a state.
    #[must_use]
    pub fn state(mut self, id: impl Into<StateId>) -> Self {
        self.states.insert(id.into());
        self
    }

    /// Declares the initial state (also added to the state set).
    #[must_use]
    pub fn initial(mut self, id: impl Into<StateId>) -> Self {
        let id = id.into();
        self.states.insert(id.clone());
        self.initial = Some(id);
        self
    }

    /// Declares a transition.
    #[must_use]
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Seeds a variable binding applied when the machine is built.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.seeds.push((name.into(), value));
        self
    }

    /// Builds the machine, validating its structure.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError`] when the initial state is missing, an
    /// endpoint is undeclared, a seed binding is rejected, or the reactive
    /// model transitions do not name exactly one input kind.
    pub fn build(self) -> Result<SymbolicMachine, MachineError> {
        let name = self.name.unwrap_or_else(|| MachineId::new("machine"));
        let machine_label = name.as_str().to_string();

        let Some(initial) = self.initial else {
            return Err(MachineError::MissingInitial {
                machine: machine_label,
            });
        };

        for transition in &self.transitions {
            for endpoint in [&transition.from, &transition.to] {
                if !self.states.contains(endpoint) {
                    return Err(MachineError::UnknownState {
                        machine: machine_label.clone(),
                        state: endpoint.as_str().to_string(),
                    });
                }
            }
        }

        let model_kinds: BTreeSet<ActionKind> = self
            .transitions
            .iter()
            .filter(|transition| transition.class() == ActionClass::ModelInput)
            .map(|transition| transition.kind.clone())
            .collect();
        let mut kinds: Vec<ActionKind> = model_kinds.into_iter().collect();
        let refined = match kinds.len() {
            0 => {
                return Err(MachineError::NoModelKind {
                    machine: machine_label,
                });
            }
            1 => kinds.swap_remove(0),
            _ => {
                return Err(MachineError::MultipleModelKinds {
                    machine: machine_label,
                    kinds: kinds.iter().map(|kind| kind.as_str().to_string()).collect(),
                });
            }
        };

        let mut variables = VariableStore::new();
        for (var_name, value) in self.seeds {
            variables.set(&var_name, value).map_err(|source| MachineError::SeedVariable {
                machine: name.as_str().to_string(),
                source,
            })?;
        }

        Ok(SymbolicMachine {
            name,
            states: self.states,
            current: initial.clone(),
            initial,
            transitions: self.transitions,
            variables,
            refined,
        })
    }
}

// ============================================================================
// SECTION: Symbolic Machine
// ============================================================================

/// IOSTS instance refining exactly one model-input kind.
///
/// # Invariants
/// - `current` and `initial` are members of `states`.
/// - All transition endpoints are members of `states`.
/// - Exactly one model-input kind appears across the reactive transitions.
#[derive(Debug)]
pub struct SymbolicMachine {
    /// Machine identifier.
    name: MachineId,
    /// Declared state set.
    states: BTreeSet<StateId>,
    /// Current state.
    current: StateId,
    /// Designated initial state.
    initial: StateId,
    /// Declared transitions; enabled sets are index sets into this list.
    transitions: Vec<Transition>,
    /// Variable store owned by this machine.
    variables: VariableStore,
    /// The unique model-input kind this machine refines, derived at build time.
    refined: ActionKind,
}

impl SymbolicMachine {
    /// Returns a builder for the named machine.
    #[must_use]
    pub fn builder(name: impl Into<MachineId>) -> MachineBuilder {
        MachineBuilder::new(name)
    }

    /// Returns the machine identifier.
    #[must_use]
    pub const fn name(&self) -> &MachineId {
        &self.name
    }

    /// Returns the current state.
    #[must_use]
    pub const fn current_state(&self) -> &StateId {
        &self.current
    }

    /// Returns the initial state.
    #[must_use]
    pub const fn initial_state(&self) -> &StateId {
        &self.initial
    }

    /// Returns true when the current state equals the initial state.
    #[must_use]
    pub fn at_initial(&self) -> bool {
        self.current == self.initial
    }

    /// Returns the model-input kind this machine refines.
    ///
    /// The kind is the unique input kind across the reactive model transitions.
    #[must_use]
    pub const fn refined_kind(&self) -> &ActionKind {
        &self.refined
    }

    /// Returns the declared state count.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Returns the declared transitions.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns the variable store.
    #[must_use]
    pub const fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Computes the enabled reactive transitions for an incoming action.
    ///
    /// A transition is enabled when its source is the current state, its
    /// keyed kind and domain match the action exactly, and its guard holds.
    ///
    /// # Errors
    ///
    /// Propagates the first guard failure as [`HookError`].
    pub fn enabled_reactive(&self, action: &Action) -> Result<Vec<usize>, HookError> {
        let mut enabled = Vec::new();
        for (index, transition) in self.transitions.iter().enumerate() {
            let Behavior::Reactive {
                guard, ..
            } = &transition.behavior
            else {
                continue;
            };
            if transition.from != self.current
                || transition.kind != *action.kind()
                || transition.domain != action.domain()
            {
                continue;
            }
            if guard(&self.variables, action)? {
                enabled.push(index);
            }
        }
        Ok(enabled)
    }

    /// Computes the enabled proactive transitions at the current state.
    ///
    /// # Errors
    ///
    /// Propagates the first guard failure as [`HookError`].
    pub fn enabled_proactive(&self) -> Result<Vec<usize>, HookError> {
        let mut enabled = Vec::new();
        for (index, transition) in self.transitions.iter().enumerate() {
            let Behavior::Proactive {
                guard, ..
            } = &transition.behavior
            else {
                continue;
            };
            if transition.from != self.current {
                continue;
            }
            if guard(&self.variables)? {
                enabled.push(index);
            }
        }
        Ok(enabled)
    }

    /// Fires a reactive transition for the supplied action.
    ///
    /// Enabledness is re-validated; the update runs before the state moves.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::IllegalTransition`] when the transition is not
    /// in the enabled set for the action, and propagates hook failures.
    pub fn fire_reactive(&mut self, action: &Action, index: usize) -> Result<(), MachineError> {
        let enabled = self.enabled_reactive(action)?;
        if !enabled.contains(&index) {
            return Err(self.illegal(index));
        }
        let transition = self.transitions[index].clone();
        let Behavior::Reactive {
            update, ..
        } = &transition.behavior
        else {
            return Err(self.illegal(index));
        };
        update(&mut self.variables, action)?;
        self.current = transition.to;
        Ok(())
    }

    /// Fires a proactive transition and returns the generated action.
    ///
    /// The generator runs first, then the update observing the generated
    /// action, then the state moves; the order is observable.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::IllegalTransition`] when the transition is not
    /// in the enabled proactive set, and propagates hook failures.
    pub fn fire_proactive(&mut self, index: usize) -> Result<Action, MachineError> {
        let enabled = self.enabled_proactive()?;
        if !enabled.contains(&index) {
            return Err(self.illegal(index));
        }
        let transition = self.transitions[index].clone();
        let Behavior::Proactive {
            update,
            generate,
            ..
        } = &transition.behavior
        else {
            return Err(self.illegal(index));
        };
        let generated = generate(&self.variables)?;
        update(&mut self.variables, &generated)?;
        self.current = transition.to;
        Ok(generated)
    }

    /// Builds an illegal-transition error for the given index.
    fn illegal(&self, index: usize) -> MachineError {
        MachineError::IllegalTransition {
            machine: self.name.as_str().to_string(),
            index,
        }
    }
}
