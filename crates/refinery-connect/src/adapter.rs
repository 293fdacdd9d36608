// crates/refinery-connect/src/adapter.rs
// ============================================================================
// Module: Action Refinery Adapter Facade
// Description: Wiring between runner connector, scheduler, and SUT executor.
// Purpose: Run a configured set of refinements against a live runner link.
// Dependencies: crate::{connector, wire}, refinery-core, thiserror
// ============================================================================

//! ## Overview
//! [`Adapter`] binds one refinement scheduler to one runner connector on a
//! designated (input-channel, output-channel) pair. Received lines on the
//! input channel decode into model inputs and drive the dispatch loop; model
//! outputs encode back onto the output channel; observed SUT events enter
//! through [`Adapter::deliver_event`]. Errors raised while handling received
//! lines are routed to the registered error handler, because the reader
//! thread has no caller to return them to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use refinery_core::CodecError;
use refinery_core::CommandExecutor;
use refinery_core::DeliveryError;
use refinery_core::ModelAction;
use refinery_core::ModelOutputSink;
use refinery_core::RefinementScheduler;
use refinery_core::SchedulerError;
use refinery_core::SymbolicMachine;
use refinery_core::SystemAction;
use refinery_core::TickSummary;
use refinery_core::TraceSink;
use refinery_core::decode_action;
use refinery_core::encode_action;
use thiserror::Error;

use crate::connector::ConnectorError;
use crate::connector::RunnerConnector;
use crate::wire::ChannelBinding;
use crate::wire::TorxAction;
use crate::wire::WireDirection;

// ============================================================================
// SECTION: Adapter Errors
// ============================================================================

/// Errors raised by the adapter facade.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Builder finished without a command executor.
    #[error("adapter has no command executor")]
    MissingExecutor,
    /// Runner connector failure.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
    /// Scheduler failure.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// A received line failed to decode as a model action.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Handler receiving errors raised on the connector reader threads.
pub type AdapterErrorHandler = dyn Fn(AdapterError) + Send + Sync;

// ============================================================================
// SECTION: Connector Output Sink
// ============================================================================

/// Model output sink encoding outputs onto the designated output channel.
struct ConnectorOutputSink {
    /// Shared runner connector.
    connector: Arc<RunnerConnector>,
    /// Designated model output channel.
    channel: String,
}

impl ModelOutputSink for ConnectorOutputSink {
    fn deliver(&self, output: &ModelAction) -> Result<(), DeliveryError> {
        self.connector
            .send_output(&self.channel, &encode_action(output))
            .map_err(|err| DeliveryError::Output(err.to_string()))
    }
}

// ============================================================================
// SECTION: Adapter Builder
// ============================================================================

/// Builder for the adapter facade.
///
/// # Invariants
/// - `build` succeeds only with a command executor configured.
pub struct AdapterBuilder {
    /// Runner host.
    host: String,
    /// Designated channel binding for the refined model dialogue.
    binding: ChannelBinding,
    /// Optional deterministic scheduler seed.
    seed: Option<u64>,
    /// Machines registered at build time.
    machines: Vec<SymbolicMachine>,
    /// System command executor toward the SUT.
    executor: Option<Arc<dyn CommandExecutor>>,
    /// Optional trace sink.
    trace: Option<Arc<dyn TraceSink>>,
    /// Handler for reader-thread errors.
    on_error: Option<Arc<AdapterErrorHandler>>,
}

impl AdapterBuilder {
    /// Creates a builder for the given runner host and channel binding.
    #[must_use]
    pub fn new(host: impl Into<String>, binding: ChannelBinding) -> Self {
        Self {
            host: host.into(),
            binding,
            seed: None,
            machines: Vec::new(),
            executor: None,
            trace: None,
            on_error: None,
        }
    }

    /// Seeds the scheduler's candidate selection.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Registers a machine.
    #[must_use]
    pub fn machine(mut self, machine: SymbolicMachine) -> Self {
        self.machines.push(machine);
        self
    }

    /// Registers the system command executor.
    #[must_use]
    pub fn command_executor(mut self, executor: impl CommandExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Registers the trace sink.
    #[must_use]
    pub fn trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Some(Arc::new(sink));
        self
    }

    /// Registers the reader-thread error handler.
    #[must_use]
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(AdapterError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Builds the adapter, wiring connector and scheduler together.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingExecutor`] without an executor and
    /// propagates connector and scheduler construction failures.
    pub fn build(self) -> Result<Adapter, AdapterError> {
        let executor = self.executor.ok_or(AdapterError::MissingExecutor)?;
        let input_channel = self.binding.input_channel.clone();
        let output_channel = self.binding.output_channel.clone();

        let connector = Arc::new(
            RunnerConnector::builder().host(self.host).binding(self.binding).build()?,
        );

        let sink = ConnectorOutputSink {
            connector: Arc::clone(&connector),
            channel: output_channel,
        };
        let mut scheduler_builder =
            RefinementScheduler::builder().output_sink(sink).command_executor(executor);
        if let Some(seed) = self.seed {
            scheduler_builder = scheduler_builder.seed(seed);
        }
        if let Some(trace) = self.trace {
            scheduler_builder = scheduler_builder.trace_sink(trace);
        }
        let scheduler = Arc::new(scheduler_builder.build()?);
        for machine in self.machines {
            let _registered = scheduler.add_machine(machine)?;
        }

        let handler_scheduler = Arc::clone(&scheduler);
        let on_error = self.on_error;
        connector.set_on_input(move |action| {
            if let Err(err) = route_input(&handler_scheduler, &input_channel, action)
                && let Some(handler) = &on_error
            {
                handler(err);
            }
        })?;

        Ok(Adapter {
            scheduler,
            connector,
        })
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Facade binding one scheduler to one runner link.
pub struct Adapter {
    /// Refinement scheduler driving the registered machines.
    scheduler: Arc<RefinementScheduler>,
    /// Runner connector owning the sockets.
    connector: Arc<RunnerConnector>,
}

impl Adapter {
    /// Returns a builder for the adapter.
    #[must_use]
    pub fn builder(host: impl Into<String>, binding: ChannelBinding) -> AdapterBuilder {
        AdapterBuilder::new(host, binding)
    }

    /// Starts the runner link.
    ///
    /// # Errors
    ///
    /// Propagates [`ConnectorError`] from the connector.
    pub fn start(&self) -> Result<(), AdapterError> {
        self.connector.start()?;
        Ok(())
    }

    /// Stops the runner link. Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates [`ConnectorError`] from the connector.
    pub fn stop(&self) -> Result<(), AdapterError> {
        self.connector.stop()?;
        Ok(())
    }

    /// Delivers an observed SUT event and runs the dispatch loop.
    ///
    /// # Errors
    ///
    /// Propagates [`SchedulerError`] from intake and dispatch.
    pub fn deliver_event(&self, event: SystemAction) -> Result<TickSummary, AdapterError> {
        let _accepted = self.scheduler.handle_system_event(event)?;
        Ok(self.scheduler.tick()?)
    }

    /// Returns the underlying scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &Arc<RefinementScheduler> {
        &self.scheduler
    }
}

impl Drop for Adapter {
    fn drop(&mut self) {
        // The scheduler and connector reference each other through the output
        // sink and the input handler, so the connector's own drop never runs
        // while that cycle is alive; release the sockets here instead.
        let _stopped = self.connector.stop();
    }
}

// ============================================================================
// SECTION: Input Routing
// ============================================================================

/// Routes one received wire action into the scheduler.
fn route_input(
    scheduler: &RefinementScheduler,
    input_channel: &str,
    action: TorxAction,
) -> Result<(), AdapterError> {
    if action.direction != WireDirection::Input || action.channel != input_channel {
        return Ok(());
    }
    let input = decode_action(&action.data)?;
    let _accepted = scheduler.handle_model_input(input)?;
    let _summary = scheduler.tick()?;
    Ok(())
}
