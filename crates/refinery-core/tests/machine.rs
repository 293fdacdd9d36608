// crates/refinery-core/tests/machine.rs
// ============================================================================
// Module: Symbolic Machine Tests
// Description: Tests for machine construction, enabled sets, and firing.
// ============================================================================
//! ## Overview
//! Validates build-time rejection of ill-formed machines and the firing
//! semantics of both transition flavors.

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

use refinery_core::Action;
use refinery_core::ActionDomain;
use refinery_core::ActionKind;
use refinery_core::FieldValue;
use refinery_core::HookError;
use refinery_core::MachineError;
use refinery_core::ModelAction;
use refinery_core::StateId;
use refinery_core::SymbolicMachine;
use refinery_core::SystemAction;
use refinery_core::Transition;

/// Builds a reactive transition that is always enabled and does nothing.
fn pass_through(from: &str, to: &str, kind: &str, domain: ActionDomain) -> Transition {
    Transition::reactive(from, to, kind, domain, |_, _| Ok(true), |_, _| Ok(()))
}

/// Tests that a builder without an initial state is rejected.
#[test]
fn test_missing_initial_rejected() {
    let err = SymbolicMachine::builder("m")
        .state("S0")
        .transition(pass_through("S0", "S0", "In", ActionDomain::Model))
        .build()
        .unwrap_err();
    assert!(matches!(err, MachineError::MissingInitial { .. }));
}

/// Tests that undeclared transition endpoints are rejected.
#[test]
fn test_unknown_endpoint_rejected() {
    let err = SymbolicMachine::builder("m")
        .initial("S0")
        .transition(pass_through("S0", "S9", "In", ActionDomain::Model))
        .build()
        .unwrap_err();
    assert!(matches!(err, MachineError::UnknownState { state, .. } if state == "S9"));
}

/// Tests that a machine consuming no model input kind is rejected.
#[test]
fn test_no_model_kind_rejected() {
    let err = SymbolicMachine::builder("m")
        .initial("S0")
        .transition(pass_through("S0", "S0", "ev", ActionDomain::System))
        .build()
        .unwrap_err();
    assert!(matches!(err, MachineError::NoModelKind { .. }));
}

/// Tests that a machine consuming several model input kinds is rejected.
#[test]
fn test_multiple_model_kinds_rejected() {
    let err = SymbolicMachine::builder("m")
        .initial("S0")
        .transition(pass_through("S0", "S0", "InA", ActionDomain::Model))
        .transition(pass_through("S0", "S0", "InB", ActionDomain::Model))
        .build()
        .unwrap_err();
    assert!(matches!(err, MachineError::MultipleModelKinds { kinds, .. } if kinds.len() == 2));
}

/// Tests that one refined input kind may pair with distinct output kinds.
#[test]
fn test_distinct_output_kinds_accepted() {
    let machine = SymbolicMachine::builder("m")
        .initial("S0")
        .state("S1")
        .transition(pass_through("S0", "S1", "InA", ActionDomain::Model))
        .transition(Transition::proactive(
            "S1",
            "S0",
            "OutB",
            ActionDomain::Model,
            |_| Ok(true),
            |_, _| Ok(()),
            |_| Ok(Action::Model(ModelAction::new("OutB"))),
        ))
        .build()
        .unwrap();
    assert_eq!(machine.refined_kind(), &ActionKind::new("InA"));
}

/// Tests seed variables and rejection of conflicting seeds.
#[test]
fn test_seed_variables() {
    let machine = SymbolicMachine::builder("m")
        .initial("S0")
        .transition(pass_through("S0", "S0", "In", ActionDomain::Model))
        .variable("limit", FieldValue::Int(3))
        .build()
        .unwrap();
    assert_eq!(machine.variables().get_int("limit").unwrap(), 3);

    let err = SymbolicMachine::builder("m")
        .initial("S0")
        .transition(pass_through("S0", "S0", "In", ActionDomain::Model))
        .variable("limit", FieldValue::Int(3))
        .variable("limit", FieldValue::Str("three".to_string()))
        .build()
        .unwrap_err();
    assert!(matches!(err, MachineError::SeedVariable { .. }));
}

/// Tests enabled-set computation against state, kind, and guard.
#[test]
fn test_enabled_reactive_matching() {
    let machine = SymbolicMachine::builder("m")
        .initial("S0")
        .state("S1")
        .transition(pass_through("S0", "S1", "In", ActionDomain::Model))
        .transition(Transition::reactive(
            "S0",
            "S1",
            "In",
            ActionDomain::Model,
            |_, _| Ok(false),
            |_, _| Ok(()),
        ))
        .transition(pass_through("S1", "S0", "ev", ActionDomain::System))
        .build()
        .unwrap();

    let input = Action::Model(ModelAction::new("In"));
    assert_eq!(machine.enabled_reactive(&input).unwrap(), vec![0]);

    let other = Action::Model(ModelAction::new("Other"));
    assert!(machine.enabled_reactive(&other).unwrap().is_empty());

    let event = Action::System(SystemAction::new("ev"));
    assert!(machine.enabled_reactive(&event).unwrap().is_empty());
}

/// Tests that kind matching is exact across domains.
#[test]
fn test_domain_must_match_kind() {
    let machine = SymbolicMachine::builder("m")
        .initial("S0")
        .state("S1")
        .transition(pass_through("S0", "S1", "In", ActionDomain::Model))
        .build()
        .unwrap();

    let masquerade = Action::System(SystemAction::new("In"));
    assert!(machine.enabled_reactive(&masquerade).unwrap().is_empty());
}

/// Tests reactive firing: update runs, state moves, stale indexes fail.
#[test]
fn test_fire_reactive() {
    let mut machine = SymbolicMachine::builder("m")
        .initial("S0")
        .state("S1")
        .transition(Transition::reactive(
            "S0",
            "S1",
            "In",
            ActionDomain::Model,
            |_, _| Ok(true),
            |vars, action| {
                if let Action::Model(input) = action
                    && let Some(FieldValue::Int(x)) = input.field("x")
                {
                    vars.set_int("seen", *x)?;
                }
                Ok(())
            },
        ))
        .build()
        .unwrap();

    let input = Action::Model(ModelAction::new("In").with_int("x", 42));
    machine.fire_reactive(&input, 0).unwrap();
    assert_eq!(machine.current_state(), &StateId::new("S1"));
    assert_eq!(machine.variables().get_int("seen").unwrap(), 42);
    assert!(!machine.at_initial());

    let err = machine.fire_reactive(&input, 0).unwrap_err();
    assert!(matches!(err, MachineError::IllegalTransition { .. }));
}

/// Tests that the proactive update observes the generated action.
#[test]
fn test_fire_proactive_order_observable() {
    let mut machine = SymbolicMachine::builder("m")
        .initial("S0")
        .state("S1")
        .transition(pass_through("S1", "S0", "In", ActionDomain::Model))
        .transition(Transition::proactive(
            "S0",
            "S1",
            "Out",
            ActionDomain::Model,
            |_| Ok(true),
            |vars, generated| {
                if let Action::Model(output) = generated
                    && let Some(FieldValue::Int(x)) = output.field("x")
                {
                    vars.set_int("emitted", *x)?;
                }
                Ok(())
            },
            |_| Ok(Action::Model(ModelAction::new("Out").with_int("x", 9))),
        ))
        .build()
        .unwrap();

    let generated = machine.fire_proactive(1).unwrap();
    assert_eq!(generated, Action::Model(ModelAction::new("Out").with_int("x", 9)));
    assert_eq!(machine.variables().get_int("emitted").unwrap(), 9);
    assert_eq!(machine.current_state(), &StateId::new("S1"));
}

/// Tests that guard failures propagate as hook errors.
#[test]
fn test_guard_failure_propagates() {
    let machine = SymbolicMachine::builder("m")
        .initial("S0")
        .transition(Transition::reactive(
            "S0",
            "S0",
            "In",
            ActionDomain::Model,
            |_, _| Err(HookError::new("guard blew up")),
            |_, _| Ok(()),
        ))
        .build()
        .unwrap();

    let input = Action::Model(ModelAction::new("In"));
    assert!(machine.enabled_reactive(&input).is_err());
}
