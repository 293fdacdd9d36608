// crates/refinery-core/src/runtime/scheduler.rs
// ============================================================================
// Module: Action Refinery Refinement Scheduler
// Description: Fixed-point dispatch across registered symbolic machines.
// Purpose: Route inputs and events through machines under atomic refinement.
// Dependencies: crate::{core, interfaces, runtime, trace}, rand, thiserror
// ============================================================================

//! ## Overview
//! The scheduler owns the registered machines, the four action-kind filter
//! sets, the FIFO input and event queues, and the active-machine pointer.
//! [`RefinementScheduler::tick`] runs the dispatch loop to quiescence:
//! proactive firings first, then one queued system event, then one queued
//! model input, re-evaluating after every step. Once a machine fires, only it
//! may fire until it returns to its initial state (atomic refinement). When
//! several transitions are enabled, one is chosen uniformly at random from
//! the candidate union; the random source is seedable for reproducible runs.
//!
//! All mutating operations share one scheduler-wide lock, held for the entire
//! dispatch loop. Guards, updates, and delivery seams run under that lock and
//! must not call back into the scheduler's mutating surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::core::Action;
use crate::core::ActionClass;
use crate::core::ActionKind;
use crate::core::HookError;
use crate::core::MachineId;
use crate::core::ModelAction;
use crate::core::StateId;
use crate::core::SystemAction;
use crate::interfaces::CommandExecutor;
use crate::interfaces::DeliveryError;
use crate::interfaces::ModelOutputSink;
use crate::runtime::machine::MachineError;
use crate::runtime::machine::SymbolicMachine;
use crate::trace::NullTraceSink;
use crate::trace::TraceEvent;
use crate::trace::TraceSink;

// ============================================================================
// SECTION: Scheduler Errors
// ============================================================================

/// Errors raised by scheduler construction and dispatch.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Atomic refinement was disabled; it is the only supported mode.
    #[error("atomic refinement is the only supported scheduling mode")]
    UnsupportedMode,
    /// No model output sink was configured.
    #[error("model output sink is not configured")]
    MissingOutputSink,
    /// No system command executor was configured.
    #[error("system command executor is not configured")]
    MissingCommandExecutor,
    /// The scheduler lock was poisoned by a panicking hook.
    #[error("scheduler state lock poisoned")]
    LockPoisoned,
    /// Removal was requested for a machine that is mid-refinement.
    #[error("machine is mid-refinement: {0}")]
    MachineActive(String),
    /// A firing was requested in a machine while another is active.
    #[error("machine {requested} cannot fire while {active} is active")]
    SystemNotActivatable {
        /// Machine the firing was requested in.
        requested: String,
        /// Machine currently holding the refinement.
        active: String,
    },
    /// Machine-level firing or validation failure.
    #[error(transparent)]
    Machine(#[from] MachineError),
    /// Guard failure during candidate computation.
    #[error(transparent)]
    Hook(#[from] HookError),
    /// Output or command delivery failure.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

// ============================================================================
// SECTION: Filter Index
// ============================================================================

/// Cached action-kind filter sets, partitioned by flavor and domain.
///
/// # Invariants
/// - The four sets are exactly the image of the registered transitions under
///   the (reactive/proactive) x (model/system) classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterIndex {
    /// Kinds consumed from the runner.
    model_inputs: BTreeSet<ActionKind>,
    /// Kinds produced toward the runner.
    model_outputs: BTreeSet<ActionKind>,
    /// Kinds produced toward the SUT.
    system_commands: BTreeSet<ActionKind>,
    /// Kinds consumed from the SUT.
    system_events: BTreeSet<ActionKind>,
}

impl FilterIndex {
    /// Rebuilds the index from the registered machines.
    fn rebuild(machines: &[SymbolicMachine]) -> Self {
        let mut index = Self::default();
        for machine in machines {
            for transition in machine.transitions() {
                let set = match transition.class() {
                    ActionClass::ModelInput => &mut index.model_inputs,
                    ActionClass::ModelOutput => &mut index.model_outputs,
                    ActionClass::SystemCommand => &mut index.system_commands,
                    ActionClass::SystemEvent => &mut index.system_events,
                };
                set.insert(transition.kind.clone());
            }
        }
        index
    }

    /// Returns the model-input kinds.
    #[must_use]
    pub const fn model_inputs(&self) -> &BTreeSet<ActionKind> {
        &self.model_inputs
    }

    /// Returns the model-output kinds.
    #[must_use]
    pub const fn model_outputs(&self) -> &BTreeSet<ActionKind> {
        &self.model_outputs
    }

    /// Returns the system-command kinds.
    #[must_use]
    pub const fn system_commands(&self) -> &BTreeSet<ActionKind> {
        &self.system_commands
    }

    /// Returns the system-event kinds.
    #[must_use]
    pub const fn system_events(&self) -> &BTreeSet<ActionKind> {
        &self.system_events
    }
}

// ============================================================================
// SECTION: Tick Summary
// ============================================================================

/// Progress counters reported by one [`RefinementScheduler::tick`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Transitions fired.
    pub firings: u64,
    /// Model outputs delivered toward the runner.
    pub outputs: u64,
    /// System commands delivered to the executor.
    pub commands: u64,
    /// System events discarded for lack of an enabled refinement.
    pub discarded_events: u64,
    /// Model inputs answered with the reserved error output.
    pub missing_refinements: u64,
}

// ============================================================================
// SECTION: Machine Snapshot
// ============================================================================

/// Read-only view of one registered machine for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSnapshot {
    /// Machine identifier.
    pub machine: MachineId,
    /// Current state.
    pub current_state: StateId,
    /// True when the machine rests at its initial state.
    pub at_initial: bool,
}

// ============================================================================
// SECTION: Scheduler Builder
// ============================================================================

/// Builder for a refinement scheduler.
///
/// # Invariants
/// - `build` succeeds only with both delivery seams configured and atomic
///   refinement enabled.
pub struct SchedulerBuilder {
    /// Atomic refinement flag; only `true` is supported.
    atomic_refinement: bool,
    /// Optional deterministic seed for candidate selection.
    seed: Option<u64>,
    /// Model output sink toward the runner transport.
    outputs: Option<Arc<dyn ModelOutputSink>>,
    /// System command executor toward the SUT.
    commands: Option<Arc<dyn CommandExecutor>>,
    /// Trace sink for structured scheduler records.
    trace: Arc<dyn TraceSink>,
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self {
            atomic_refinement: true,
            seed: None,
            outputs: None,
            commands: None,
            trace: Arc::new(NullTraceSink),
        }
    }
}

impl SchedulerBuilder {
    /// Sets the atomic refinement flag. Only `true` builds.
    #[must_use]
    pub const fn atomic_refinement(mut self, enabled: bool) -> Self {
        self.atomic_refinement = enabled;
        self
    }

    /// Seeds the candidate selection source for reproducible runs.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Registers the model output sink.
    #[must_use]
    pub fn output_sink(mut self, sink: impl ModelOutputSink + 'static) -> Self {
        self.outputs = Some(Arc::new(sink));
        self
    }

    /// Registers the system command executor.
    #[must_use]
    pub fn command_executor(mut self, executor: impl CommandExecutor + 'static) -> Self {
        self.commands = Some(Arc::new(executor));
        self
    }

    /// Registers the trace sink.
    #[must_use]
    pub fn trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Arc::new(sink);
        self
    }

    /// Builds the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnsupportedMode`] when atomic refinement is
    /// disabled and [`SchedulerError::MissingOutputSink`] or
    /// [`SchedulerError::MissingCommandExecutor`] for unconfigured seams.
    pub fn build(self) -> Result<RefinementScheduler, SchedulerError> {
        if !self.atomic_refinement {
            return Err(SchedulerError::UnsupportedMode);
        }
        let outputs = self.outputs.ok_or(SchedulerError::MissingOutputSink)?;
        let commands = self.commands.ok_or(SchedulerError::MissingCommandExecutor)?;
        let rng = self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(RefinementScheduler {
            state: Mutex::new(SchedulerState {
                machines: Vec::new(),
                filters: FilterIndex::default(),
                inputs: VecDeque::new(),
                events: VecDeque::new(),
                active: None,
                rng,
            }),
            outputs,
            commands,
            trace: self.trace,
        })
    }
}

// ============================================================================
// SECTION: Scheduler State
// ============================================================================

/// Mutable scheduler state guarded by the scheduler-wide lock.
struct SchedulerState {
    /// Registered machines in registration order.
    machines: Vec<SymbolicMachine>,
    /// Cached filter sets over the registered transitions.
    filters: FilterIndex,
    /// FIFO queue of accepted model inputs.
    inputs: VecDeque<ModelAction>,
    /// FIFO queue of accepted system events.
    events: VecDeque<SystemAction>,
    /// Index of the machine holding the refinement, if any.
    active: Option<usize>,
    /// Random source for uniform candidate selection.
    rng: StdRng,
}

impl SchedulerState {
    /// Returns the machine indices in dispatch scope.
    fn scope(&self) -> Vec<usize> {
        self.active.map_or_else(|| (0 .. self.machines.len()).collect(), |index| vec![index])
    }
}

// ============================================================================
// SECTION: Refinement Scheduler
// ============================================================================

/// Fixed-point dispatcher over registered symbolic machines.
///
/// # Invariants
/// - At most one machine is off its initial state, and it is the active one.
/// - Queue elements are pre-filtered by kind membership.
pub struct RefinementScheduler {
    /// Lock-guarded mutable state.
    state: Mutex<SchedulerState>,
    /// Model output sink toward the runner transport.
    outputs: Arc<dyn ModelOutputSink>,
    /// System command executor toward the SUT.
    commands: Arc<dyn CommandExecutor>,
    /// Trace sink for structured scheduler records.
    trace: Arc<dyn TraceSink>,
}

impl RefinementScheduler {
    /// Returns a builder for the scheduler.
    #[must_use]
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }

    /// Registers a machine and reindexes the filter sets.
    ///
    /// Adding a machine whose name is already registered is a no-op and
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn add_machine(&self, machine: SymbolicMachine) -> Result<bool, SchedulerError> {
        let mut state = self.lock()?;
        if state.machines.iter().any(|existing| existing.name() == machine.name()) {
            return Ok(false);
        }
        self.trace.record(&TraceEvent::MachineRegistered {
            machine: machine.name().as_str().to_string(),
        });
        state.machines.push(machine);
        state.filters = FilterIndex::rebuild(&state.machines);
        Ok(true)
    }

    /// Removes a machine by name and reindexes the filter sets.
    ///
    /// Returns `false` when no machine of that name is registered.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::MachineActive`] when the machine is
    /// mid-refinement and [`SchedulerError::LockPoisoned`] on a poisoned lock.
    pub fn remove_machine(&self, name: &MachineId) -> Result<bool, SchedulerError> {
        let mut state = self.lock()?;
        let Some(index) = state.machines.iter().position(|machine| machine.name() == name)
        else {
            return Ok(false);
        };
        if state.active == Some(index) {
            return Err(SchedulerError::MachineActive(name.as_str().to_string()));
        }
        let removed = state.machines.remove(index);
        if let Some(active) = state.active
            && active > index
        {
            state.active = Some(active - 1);
        }
        state.filters = FilterIndex::rebuild(&state.machines);
        self.trace.record(&TraceEvent::MachineRemoved {
            machine: removed.name().as_str().to_string(),
        });
        Ok(true)
    }

    /// Accepts a model input from the runner.
    ///
    /// Inputs whose kind is outside the model-input filter set are dropped
    /// with a trace record; accepted inputs are enqueued in FIFO order. This
    /// never advances the scheduler: the embedder calls [`Self::tick`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn handle_model_input(&self, input: ModelAction) -> Result<bool, SchedulerError> {
        let mut state = self.lock()?;
        if !state.filters.model_inputs.contains(&input.kind) {
            self.trace.record(&TraceEvent::InputDropped {
                kind: input.kind.as_str().to_string(),
            });
            return Ok(false);
        }
        state.inputs.push_back(input);
        Ok(true)
    }

    /// Accepts a system event observed on the SUT.
    ///
    /// Events whose kind is outside the system-event filter set are dropped
    /// with a trace record; accepted events are enqueued in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn handle_system_event(&self, event: SystemAction) -> Result<bool, SchedulerError> {
        let mut state = self.lock()?;
        if !state.filters.system_events.contains(&event.kind) {
            self.trace.record(&TraceEvent::EventDropped {
                kind: event.kind.as_str().to_string(),
            });
            return Ok(false);
        }
        state.events.push_back(event);
        Ok(true)
    }

    /// Runs the dispatch loop to quiescence.
    ///
    /// Each pass evaluates the phases in strict order and consumes at most
    /// one queue element: enabled proactive transitions fire first, then one
    /// queued system event, then one queued model input. The loop re-runs
    /// after every pass that made progress or left a queue non-empty, and
    /// returns once both queues are empty and no proactive transition is
    /// enabled in scope.
    ///
    /// # Errors
    ///
    /// Propagates hook failures and delivery failures; already-dequeued
    /// elements stay consumed, everything else keeps its pre-firing state.
    pub fn tick(&self) -> Result<TickSummary, SchedulerError> {
        let mut state = self.lock()?;
        let mut summary = TickSummary::default();
        loop {
            let progressed = self.step(&mut state, &mut summary)?;
            if progressed || !state.inputs.is_empty() || !state.events.is_empty() {
                continue;
            }
            return Ok(summary);
        }
    }

    /// Delivers a model output through the configured sink.
    ///
    /// Outputs whose kind is outside the model-output filter set are dropped
    /// with a trace record; the reserved refinement-error kind always passes.
    ///
    /// # Errors
    ///
    /// Propagates [`DeliveryError`] from the sink.
    pub fn send_model_output(&self, output: &ModelAction) -> Result<bool, SchedulerError> {
        let state = self.lock()?;
        self.deliver_output(&state, output)
    }

    /// Delivers a system command through the configured executor.
    ///
    /// Commands whose kind is outside the system-command filter set are
    /// dropped with a trace record.
    ///
    /// # Errors
    ///
    /// Propagates [`DeliveryError`] from the executor.
    pub fn send_system_command(&self, command: &SystemAction) -> Result<bool, SchedulerError> {
        let state = self.lock()?;
        self.deliver_command(&state, command)
    }

    /// Returns a clone of the current filter index.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn filter_index(&self) -> Result<FilterIndex, SchedulerError> {
        Ok(self.lock()?.filters.clone())
    }

    /// Returns the name of the machine holding the refinement, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn active_machine(&self) -> Result<Option<MachineId>, SchedulerError> {
        let state = self.lock()?;
        Ok(state.active.map(|index| state.machines[index].name().clone()))
    }

    /// Returns the queued input and event counts.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn queue_depths(&self) -> Result<(usize, usize), SchedulerError> {
        let state = self.lock()?;
        Ok((state.inputs.len(), state.events.len()))
    }

    /// Returns snapshots of all registered machines.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::LockPoisoned`] when the lock is poisoned.
    pub fn machine_snapshots(&self) -> Result<Vec<MachineSnapshot>, SchedulerError> {
        let state = self.lock()?;
        Ok(state
            .machines
            .iter()
            .map(|machine| MachineSnapshot {
                machine: machine.name().clone(),
                current_state: machine.current_state().clone(),
                at_initial: machine.at_initial(),
            })
            .collect())
    }

    /// Returns true when both queues are empty and no proactive transition is
    /// enabled in scope.
    ///
    /// # Errors
    ///
    /// Propagates guard failures and lock poisoning.
    pub fn is_quiescent(&self) -> Result<bool, SchedulerError> {
        let state = self.lock()?;
        if !state.inputs.is_empty() || !state.events.is_empty() {
            return Ok(false);
        }
        for index in state.scope() {
            if !state.machines[index].enabled_proactive()?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Dispatch internals
    // ------------------------------------------------------------------

    /// Runs one dispatch pass; returns true when a phase made progress.
    fn step(
        &self,
        state: &mut SchedulerState,
        summary: &mut TickSummary,
    ) -> Result<bool, SchedulerError> {
        // Phase P: proactive firings take precedence over both queues.
        let mut candidates = Vec::new();
        for machine_index in state.scope() {
            for transition_index in state.machines[machine_index].enabled_proactive()? {
                candidates.push((machine_index, transition_index));
            }
        }
        if !candidates.is_empty() {
            let (machine_index, transition_index) = Self::choose(&mut state.rng, &candidates);
            let generated = self.fire_proactive(state, machine_index, transition_index)?;
            summary.firings += 1;
            match generated {
                Action::Model(output) => {
                    if self.deliver_output(state, &output)? {
                        summary.outputs += 1;
                    }
                }
                Action::System(command) => {
                    if self.deliver_command(state, &command)? {
                        summary.commands += 1;
                    }
                }
            }
            return Ok(true);
        }

        // Phase E: events are observations and precede fresh stimuli.
        if let Some(event) = state.events.pop_front() {
            let action = Action::System(event);
            let mut candidates = Vec::new();
            for machine_index in state.scope() {
                for transition_index in state.machines[machine_index].enabled_reactive(&action)? {
                    candidates.push((machine_index, transition_index));
                }
            }
            if candidates.is_empty() {
                self.trace.record(&TraceEvent::EventDiscarded {
                    kind: action.kind().as_str().to_string(),
                });
                summary.discarded_events += 1;
                return Ok(false);
            }
            let (machine_index, transition_index) = Self::choose(&mut state.rng, &candidates);
            self.fire_reactive(state, machine_index, transition_index, &action)?;
            summary.firings += 1;
            return Ok(true);
        }

        // Phase I: one fresh model input, answered with the reserved error
        // output when no refinement is enabled so the runner never waits.
        if let Some(input) = state.inputs.pop_front() {
            let action = Action::Model(input);
            let mut candidates = Vec::new();
            for machine_index in state.scope() {
                for transition_index in state.machines[machine_index].enabled_reactive(&action)? {
                    candidates.push((machine_index, transition_index));
                }
            }
            if candidates.is_empty() {
                self.trace.record(&TraceEvent::RefinementMissing {
                    kind: action.kind().as_str().to_string(),
                });
                summary.missing_refinements += 1;
                let error_output = ModelAction::refinement_error(action.kind());
                if self.deliver_output(state, &error_output)? {
                    summary.outputs += 1;
                }
                return Ok(true);
            }
            let (machine_index, transition_index) = Self::choose(&mut state.rng, &candidates);
            self.fire_reactive(state, machine_index, transition_index, &action)?;
            summary.firings += 1;
            return Ok(true);
        }

        Ok(false)
    }

    /// Picks one candidate uniformly at random from the union.
    fn choose(rng: &mut StdRng, candidates: &[(usize, usize)]) -> (usize, usize) {
        if candidates.len() == 1 {
            return candidates[0];
        }
        candidates[rng.gen_range(0 .. candidates.len())]
    }

    /// Fires a proactive transition and applies activation bookkeeping.
    fn fire_proactive(
        &self,
        state: &mut SchedulerState,
        machine_index: usize,
        transition_index: usize,
    ) -> Result<Action, SchedulerError> {
        Self::ensure_activatable(state, machine_index)?;
        let generated = state.machines[machine_index].fire_proactive(transition_index)?;
        self.after_fire(state, machine_index, transition_index);
        Ok(generated)
    }

    /// Fires a reactive transition and applies activation bookkeeping.
    fn fire_reactive(
        &self,
        state: &mut SchedulerState,
        machine_index: usize,
        transition_index: usize,
        action: &Action,
    ) -> Result<(), SchedulerError> {
        Self::ensure_activatable(state, machine_index)?;
        state.machines[machine_index].fire_reactive(action, transition_index)?;
        self.after_fire(state, machine_index, transition_index);
        Ok(())
    }

    /// Rejects firings outside the active machine.
    fn ensure_activatable(
        state: &SchedulerState,
        machine_index: usize,
    ) -> Result<(), SchedulerError> {
        if let Some(active) = state.active
            && active != machine_index
        {
            return Err(SchedulerError::SystemNotActivatable {
                requested: state.machines[machine_index].name().as_str().to_string(),
                active: state.machines[active].name().as_str().to_string(),
            });
        }
        Ok(())
    }

    /// Records the firing and maintains the active-machine pointer.
    ///
    /// The refinement closes when the fired machine rests at its initial
    /// state again; otherwise the machine holds the refinement.
    fn after_fire(&self, state: &mut SchedulerState, machine_index: usize, transition_index: usize) {
        let machine = &state.machines[machine_index];
        let transition = &machine.transitions()[transition_index];
        self.trace.record(&TraceEvent::TransitionFired {
            machine: machine.name().as_str().to_string(),
            from: transition.from.as_str().to_string(),
            to: transition.to.as_str().to_string(),
            kind: transition.kind.as_str().to_string(),
        });
        if machine.at_initial() {
            state.active = None;
        } else {
            state.active = Some(machine_index);
        }
    }

    /// Delivers a model output, honoring the output filter.
    fn deliver_output(
        &self,
        state: &SchedulerState,
        output: &ModelAction,
    ) -> Result<bool, SchedulerError> {
        if !state.filters.model_outputs.contains(&output.kind) && !output.is_refinement_error() {
            self.trace.record(&TraceEvent::OutputDropped {
                kind: output.kind.as_str().to_string(),
            });
            return Ok(false);
        }
        self.outputs.deliver(output)?;
        self.trace.record(&TraceEvent::OutputDispatched {
            kind: output.kind.as_str().to_string(),
        });
        Ok(true)
    }

    /// Delivers a system command, honoring the command filter.
    fn deliver_command(
        &self,
        state: &SchedulerState,
        command: &SystemAction,
    ) -> Result<bool, SchedulerError> {
        if !state.filters.system_commands.contains(&command.kind) {
            self.trace.record(&TraceEvent::CommandDropped {
                kind: command.kind.as_str().to_string(),
            });
            return Ok(false);
        }
        self.commands.execute(command)?;
        self.trace.record(&TraceEvent::CommandDispatched {
            kind: command.kind.as_str().to_string(),
        });
        Ok(true)
    }

    /// Locks the scheduler state, mapping poisoning into a stable error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SchedulerState>, SchedulerError> {
        self.state.lock().map_err(|_| SchedulerError::LockPoisoned)
    }
}
