// crates/refinery-core/tests/common/mod.rs
// ============================================================================
// Module: Scheduler Test Fixtures
// Description: Shared machine shapes and scheduler wiring for tests.
// ============================================================================
//! ## Overview
//! Builds the recurring machine shapes used across the scheduler tests.

#![allow(dead_code, reason = "Shared fixtures are not used by every test binary.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers may panic on malformed fixtures."
)]

use refinery_core::Action;
use refinery_core::ActionDomain;
use refinery_core::ModelAction;
use refinery_core::RecordingExecutor;
use refinery_core::RecordingOutputSink;
use refinery_core::RefinementScheduler;
use refinery_core::SymbolicMachine;
use refinery_core::SystemAction;
use refinery_core::Transition;

/// Scheduler wired to recording seams with a fixed seed.
pub struct Harness {
    /// Scheduler under test.
    pub scheduler: RefinementScheduler,
    /// Recorded model outputs.
    pub outputs: RecordingOutputSink,
    /// Recorded system commands.
    pub commands: RecordingExecutor,
}

/// Builds a seeded scheduler around recording seams.
pub fn harness(seed: u64) -> Harness {
    let outputs = RecordingOutputSink::new();
    let commands = RecordingExecutor::new();
    let scheduler = RefinementScheduler::builder()
        .seed(seed)
        .output_sink(outputs.clone())
        .command_executor(commands.clone())
        .build()
        .expect("scheduler builds with both seams configured");
    Harness {
        scheduler,
        outputs,
        commands,
    }
}

/// Two-state relay: consumes `input_kind`, answers `output_kind`, loops closed.
pub fn relay_machine(name: &str, input_kind: &str, output_kind: &str) -> SymbolicMachine {
    let produced = output_kind.to_string();
    SymbolicMachine::builder(name)
        .initial("S0")
        .state("S1")
        .transition(Transition::reactive(
            "S0",
            "S1",
            input_kind,
            ActionDomain::Model,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .transition(Transition::proactive(
            "S1",
            "S0",
            output_kind,
            ActionDomain::Model,
            |_| Ok(true),
            |_, _| Ok(()),
            move |_| Ok(Action::Model(ModelAction::new(produced.as_str()))),
        ))
        .build()
        .expect("relay machine is well-formed")
}

/// Three-state refinement: input, one SUT command, one closing SUT event.
///
/// The `ModelOutputOK` self-loop at the initial state stays disabled: its
/// guard reads the `emit_ok` variable, which nothing sets.
pub fn command_machine(name: &str) -> SymbolicMachine {
    SymbolicMachine::builder(name)
        .initial("S0")
        .state("S1")
        .state("S2")
        .transition(Transition::reactive(
            "S0",
            "S1",
            "ModelInputA",
            ActionDomain::Model,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .transition(Transition::proactive(
            "S1",
            "S2",
            "SysCmdC",
            ActionDomain::System,
            |_| Ok(true),
            |_, _| Ok(()),
            |_| Ok(Action::System(SystemAction::new("SysCmdC"))),
        ))
        .transition(Transition::reactive(
            "S2",
            "S0",
            "SysEventD",
            ActionDomain::System,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .transition(Transition::proactive(
            "S0",
            "S0",
            "ModelOutputOK",
            ActionDomain::Model,
            |vars| Ok(vars.get_bool("emit_ok").unwrap_or(false)),
            |_, _| Ok(()),
            |_| Ok(Action::Model(ModelAction::new("ModelOutputOK"))),
        ))
        .build()
        .expect("command machine is well-formed")
}

/// Machine holding a refinement open: a proactive command moves it off its
/// initial state, a closing SUT event brings it back.
pub fn lockout_machine(name: &str, input_kind: &str, command_kind: &str) -> SymbolicMachine {
    let command = command_kind.to_string();
    SymbolicMachine::builder(name)
        .initial("S0")
        .state("S1")
        .transition(Transition::reactive(
            "S0",
            "S0",
            input_kind,
            ActionDomain::Model,
            |_, _| Ok(false),
            |_, _| Ok(()),
        ))
        .transition(Transition::proactive(
            "S0",
            "S1",
            command_kind,
            ActionDomain::System,
            |vars| Ok(!vars.get_bool("sent").unwrap_or(false)),
            |vars, _| {
                vars.set_bool("sent", true)?;
                Ok(())
            },
            move |_| Ok(Action::System(SystemAction::new(command.as_str()))),
        ))
        .transition(Transition::reactive(
            "S1",
            "S0",
            "CloseEvent",
            ActionDomain::System,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .build()
        .expect("lockout machine is well-formed")
}
