// crates/refinery-core/tests/filters.rs
// ============================================================================
// Module: Filter Index Tests
// Description: Filter-set partition and queue pre-filtering invariants.
// ============================================================================
//! ## Overview
//! Validates that the four filter sets mirror the registered transitions and
//! that intake admits member kinds only.

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

use refinery_core::ActionKind;
use refinery_core::MachineId;
use refinery_core::ModelAction;
use refinery_core::SystemAction;

/// Tests that the filter sets are exactly the classified transition kinds.
#[test]
fn test_filter_partition_mirrors_transitions() {
    let fixture = common::harness(1);
    assert!(fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());

    let filters = fixture.scheduler.filter_index().unwrap();
    assert_eq!(
        filters.model_inputs().iter().cloned().collect::<Vec<_>>(),
        vec![ActionKind::new("ModelInputA")]
    );
    assert_eq!(
        filters.model_outputs().iter().cloned().collect::<Vec<_>>(),
        vec![ActionKind::new("ModelOutputOK")]
    );
    assert_eq!(
        filters.system_commands().iter().cloned().collect::<Vec<_>>(),
        vec![ActionKind::new("SysCmdC")]
    );
    assert_eq!(
        filters.system_events().iter().cloned().collect::<Vec<_>>(),
        vec![ActionKind::new("SysEventD")]
    );
}

/// Tests that registration and removal reindex the filter sets.
#[test]
fn test_registration_reindexes() {
    let fixture = common::harness(1);
    assert!(fixture.scheduler.add_machine(common::relay_machine("r1", "InA", "OutA")).unwrap());
    assert!(fixture.scheduler.add_machine(common::relay_machine("r2", "InB", "OutB")).unwrap());

    let filters = fixture.scheduler.filter_index().unwrap();
    assert_eq!(filters.model_inputs().len(), 2);
    assert_eq!(filters.model_outputs().len(), 2);
    assert!(filters.system_commands().is_empty());
    assert!(filters.system_events().is_empty());

    assert!(fixture.scheduler.remove_machine(&MachineId::new("r1")).unwrap());
    let filters = fixture.scheduler.filter_index().unwrap();
    assert_eq!(
        filters.model_inputs().iter().cloned().collect::<Vec<_>>(),
        vec![ActionKind::new("InB")]
    );
}

/// Tests that intake enqueues member kinds only.
#[test]
fn test_intake_prefilters_queues() {
    let fixture = common::harness(1);
    assert!(fixture.scheduler.add_machine(common::command_machine("cmd")).unwrap());

    assert!(fixture.scheduler.handle_model_input(ModelAction::new("ModelInputA")).unwrap());
    assert!(!fixture.scheduler.handle_model_input(ModelAction::new("SysCmdC")).unwrap());
    assert!(fixture.scheduler.handle_system_event(SystemAction::new("SysEventD")).unwrap());
    assert!(!fixture.scheduler.handle_system_event(SystemAction::new("ModelInputA")).unwrap());

    assert_eq!(fixture.scheduler.queue_depths().unwrap(), (1, 1));
}

/// Tests that an empty scheduler accepts nothing.
#[test]
fn test_empty_scheduler_accepts_nothing() {
    let fixture = common::harness(1);
    assert!(!fixture.scheduler.handle_model_input(ModelAction::new("Anything")).unwrap());
    assert!(!fixture.scheduler.handle_system_event(SystemAction::new("Anything")).unwrap());
    assert!(fixture.scheduler.filter_index().unwrap().model_inputs().is_empty());
}
