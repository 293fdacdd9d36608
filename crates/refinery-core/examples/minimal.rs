// crates/refinery-core/examples/minimal.rs
// ============================================================================
// Module: Action Refinery Minimal Example
// Description: Minimal end-to-end refinement using recording seams.
// Purpose: Demonstrate one input-to-output refinement cycle.
// Dependencies: refinery-core
// ============================================================================

//! ## Overview
//! Runs one refinement cycle with in-memory delivery seams: a model input
//! drives the machine off its initial state, a command reaches the recording
//! executor, a simulated SUT event closes the loop, and a model output comes
//! back. This example is transport-free and suitable for quick verification.

use refinery_core::Action;
use refinery_core::ActionDomain;
use refinery_core::ModelAction;
use refinery_core::RecordingExecutor;
use refinery_core::RecordingOutputSink;
use refinery_core::RefinementScheduler;
use refinery_core::SymbolicMachine;
use refinery_core::SystemAction;
use refinery_core::Transition;

/// Error type for example postconditions.
#[derive(Debug)]
struct ExampleError(&'static str);

impl std::fmt::Display for ExampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ExampleError {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let machine = SymbolicMachine::builder("login")
        .initial("Idle")
        .state("Sent")
        .state("Confirmed")
        .transition(Transition::reactive(
            "Idle",
            "Sent",
            "LoginRequest",
            ActionDomain::Model,
            |_, _| Ok(true),
            |vars, action| {
                if let Action::Model(input) = action
                    && let Some(refinery_core::FieldValue::Str(user)) = input.field("user")
                {
                    vars.set_str("user", user.clone())?;
                }
                Ok(())
            },
        ))
        .transition(Transition::proactive(
            "Sent",
            "Confirmed",
            "sut_login",
            ActionDomain::System,
            |_| Ok(true),
            |_, _| Ok(()),
            |_| Ok(Action::System(SystemAction::new("sut_login"))),
        ))
        .transition(Transition::reactive(
            "Confirmed",
            "Done",
            "sut_login_ok",
            ActionDomain::System,
            |_, _| Ok(true),
            |_, _| Ok(()),
        ))
        .state("Done")
        .transition(Transition::proactive(
            "Done",
            "Idle",
            "LoginResult",
            ActionDomain::Model,
            |_| Ok(true),
            |_, _| Ok(()),
            |vars| {
                let user = vars.get_str("user").map_or_else(|_| "unknown".to_string(), Into::into);
                Ok(Action::Model(ModelAction::new("LoginResult").with_str("user", user)))
            },
        ))
        .build()?;

    let outputs = RecordingOutputSink::new();
    let commands = RecordingExecutor::new();
    let scheduler = RefinementScheduler::builder()
        .seed(7)
        .output_sink(outputs.clone())
        .command_executor(commands.clone())
        .build()?;
    let _registered = scheduler.add_machine(machine)?;

    let _accepted =
        scheduler.handle_model_input(ModelAction::new("LoginRequest").with_str("user", "ada"))?;
    let _summary = scheduler.tick()?;

    let _accepted = scheduler.handle_system_event(SystemAction::new("sut_login_ok"))?;
    let _summary = scheduler.tick()?;

    if commands.take().len() != 1 {
        return Err(ExampleError("expected exactly one SUT command").into());
    }
    if outputs.take().len() != 1 {
        return Err(ExampleError("expected exactly one model output").into());
    }
    if !scheduler.is_quiescent()? {
        return Err(ExampleError("scheduler should be quiescent").into());
    }
    Ok(())
}
