// crates/refinery-core/tests/scheduler_errors.rs
// ============================================================================
// Module: Scheduler Error Tests
// Description: Error arms of intake, dispatch, and registration.
// ============================================================================
//! ## Overview
//! Validates refinement misses, filtered drops, registration guards, and
//! failure propagation out of the dispatch loop.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use refinery_core::Action;
use refinery_core::ActionDomain;
use refinery_core::ActionKind;
use refinery_core::DeliveryError;
use refinery_core::HookError;
use refinery_core::MachineId;
use refinery_core::ModelAction;
use refinery_core::ModelOutputSink;
use refinery_core::RecordingExecutor;
use refinery_core::RefinementScheduler;
use refinery_core::SchedulerError;
use refinery_core::SymbolicMachine;
use refinery_core::SystemAction;
use refinery_core::Transition;

/// Tests that an unmatched but known input yields one error output.
#[test]
fn test_unmatched_input_emits_error_output() {
    let fixture = common::harness(2);
    // The machine consumes ModelInputZ, but only from a state it never
    // occupies at intake time, so the kind passes the filter while Phase I
    // finds no enabled refinement.
    let machine = SymbolicMachine::builder("z")
        .initial("S0")
        .state("S1")
        .transition(Transition::reactive(
            "S1",
            "S0",
            "ModelInputZ",
            ActionDomain::Model,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .build()
        .unwrap();
    assert!(fixture.scheduler.add_machine(machine).unwrap());

    assert!(fixture.scheduler.handle_model_input(ModelAction::new("ModelInputZ")).unwrap());
    let summary = fixture.scheduler.tick().unwrap();

    let outputs = fixture.outputs.take();
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].is_refinement_error());
    assert_eq!(summary.missing_refinements, 1);
    assert_eq!(fixture.scheduler.queue_depths().unwrap(), (0, 0));
    assert_eq!(fixture.scheduler.active_machine().unwrap(), None);
}

/// Tests that inputs outside the filter set are dropped silently.
#[test]
fn test_filtered_input_dropped() {
    let fixture = common::harness(2);
    assert!(fixture.scheduler.add_machine(common::relay_machine("relay", "InA", "OutB")).unwrap());

    assert!(!fixture.scheduler.handle_model_input(ModelAction::new("ModelInputY")).unwrap());
    assert_eq!(fixture.scheduler.queue_depths().unwrap(), (0, 0));

    let summary = fixture.scheduler.tick().unwrap();
    assert_eq!(summary.firings, 0);
    assert!(fixture.outputs.take().is_empty());
}

/// Tests that events outside the filter set are dropped silently.
#[test]
fn test_filtered_event_dropped() {
    let fixture = common::harness(2);
    assert!(fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());

    assert!(!fixture.scheduler.handle_system_event(SystemAction::new("UnknownEvent")).unwrap());
    assert_eq!(fixture.scheduler.queue_depths().unwrap(), (0, 0));
}

/// Tests that a queued event with no enabled refinement is discarded.
#[test]
fn test_unmatched_event_discarded() {
    let fixture = common::harness(2);
    assert!(fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());

    // SysEventD is a known kind, but its transition starts at S2 and the
    // machine rests at S0.
    assert!(fixture.scheduler.handle_system_event(SystemAction::new("SysEventD")).unwrap());
    let summary = fixture.scheduler.tick().unwrap();

    assert_eq!(summary.discarded_events, 1);
    assert_eq!(summary.firings, 0);
    assert!(fixture.outputs.take().is_empty());
    assert_eq!(fixture.scheduler.queue_depths().unwrap(), (0, 0));
}

/// Tests registration idempotency and removal guards.
#[test]
fn test_registration_guards() {
    let fixture = common::harness(2);
    assert!(fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());
    assert!(!fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());

    assert!(!fixture.scheduler.remove_machine(&MachineId::new("absent")).unwrap());

    // Drive the machine off its initial state, then removal must refuse.
    assert!(fixture.scheduler.handle_model_input(ModelAction::new("ModelInputA")).unwrap());
    let _summary = fixture.scheduler.tick().unwrap();
    let err = fixture.scheduler.remove_machine(&MachineId::new("cmd")).unwrap_err();
    assert!(matches!(err, SchedulerError::MachineActive(_)));

    // Close the refinement, then removal succeeds.
    assert!(fixture.scheduler.handle_system_event(SystemAction::new("SysEventD")).unwrap());
    let _summary = fixture.scheduler.tick().unwrap();
    assert!(fixture.scheduler.remove_machine(&MachineId::new("cmd")).unwrap());
    assert!(fixture.scheduler.filter_index().unwrap().model_inputs().is_empty());
}

/// Tests that disabling atomic refinement is rejected at build time.
#[test]
fn test_unsupported_mode_rejected() {
    let err = RefinementScheduler::builder()
        .atomic_refinement(false)
        .output_sink(refinery_core::RecordingOutputSink::new())
        .command_executor(RecordingExecutor::new())
        .build()
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::UnsupportedMode));
}

/// Tests that both delivery seams are required at build time.
#[test]
fn test_missing_seams_rejected() {
    let err = RefinementScheduler::builder()
        .command_executor(RecordingExecutor::new())
        .build()
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::MissingOutputSink));

    let err = RefinementScheduler::builder()
        .output_sink(refinery_core::RecordingOutputSink::new())
        .build()
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::MissingCommandExecutor));
}

/// Tests that a proactive guard failure leaves the queues intact.
#[test]
fn test_guard_failure_preserves_queue() {
    let fixture = common::harness(2);
    let machine = SymbolicMachine::builder("broken")
        .initial("S0")
        .transition(Transition::reactive(
            "S0",
            "S0",
            "In",
            ActionDomain::Model,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .transition(Transition::proactive(
            "S0",
            "S0",
            "Out",
            ActionDomain::Model,
            |_| Err(HookError::new("guard failure")),
            |_, _| Ok(()),
            |_| Ok(Action::Model(ModelAction::new("Out"))),
        ))
        .build()
        .unwrap();
    assert!(fixture.scheduler.add_machine(machine).unwrap());

    assert!(fixture.scheduler.handle_model_input(ModelAction::new("In")).unwrap());
    let err = fixture.scheduler.tick().map(|_| ()).unwrap_err();
    assert!(matches!(err, SchedulerError::Hook(_)));

    // Phase P failed before Phase I could dequeue, so the input survives.
    assert_eq!(fixture.scheduler.queue_depths().unwrap(), (1, 0));
    assert_eq!(fixture.scheduler.active_machine().unwrap(), None);
}

/// Output sink that rejects every delivery.
struct FailingSink;

impl ModelOutputSink for FailingSink {
    fn deliver(&self, _output: &ModelAction) -> Result<(), DeliveryError> {
        Err(DeliveryError::Output("runner link down".to_string()))
    }
}

/// Tests that delivery failures propagate out of the dispatch loop.
#[test]
fn test_delivery_failure_propagates() {
    let commands = RecordingExecutor::new();
    let scheduler = RefinementScheduler::builder()
        .seed(2)
        .output_sink(FailingSink)
        .command_executor(commands)
        .build()
        .unwrap();
    assert!(scheduler.add_machine(common::relay_machine("relay", "InA", "OutB")).unwrap());

    assert!(scheduler.handle_model_input(ModelAction::new("InA")).unwrap());
    let err = scheduler.tick().map(|_| ()).unwrap_err();
    assert!(matches!(err, SchedulerError::Delivery(DeliveryError::Output(_))));
}

/// Tests the public delivery primitives and their filters.
#[test]
fn test_send_primitives_filtered() {
    let fixture = common::harness(2);
    assert!(fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());

    // ModelOutputOK is in the output filter; unknown kinds are dropped.
    assert!(fixture.scheduler.send_model_output(&ModelAction::new("ModelOutputOK")).unwrap());
    assert!(!fixture.scheduler.send_model_output(&ModelAction::new("Mystery")).unwrap());

    // The reserved error kind always passes the output filter.
    let error = ModelAction::refinement_error(&ActionKind::new("Mystery"));
    assert!(fixture.scheduler.send_model_output(&error).unwrap());

    assert!(fixture.scheduler.send_system_command(&SystemAction::new("SysCmdC")).unwrap());
    assert!(!fixture.scheduler.send_system_command(&SystemAction::new("Mystery")).unwrap());

    let outputs = fixture.outputs.take();
    assert_eq!(outputs.len(), 2);
    assert_eq!(fixture.commands.take().len(), 1);
}
