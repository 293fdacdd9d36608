// crates/refinery-core/src/trace.rs
// ============================================================================
// Module: Action Refinery Trace Events
// Description: Structured trace records for scheduler observability.
// Purpose: Surface drops, discards, and firings without a hard logging dep.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! The scheduler reports noteworthy steps as structured [`TraceEvent`]
//! records through a [`TraceSink`]. The interface is intentionally
//! dependency-light so deployments can route records into their own logging
//! stack without redesign; the bundled writer sink emits one JSON record per
//! line. Sinks are invoked under the scheduler lock and must not block.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Trace Events
// ============================================================================

/// Structured scheduler trace record.
///
/// # Invariants
/// - Variants are stable for serialization; payloads are identifier strings only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A machine was registered with the scheduler.
    MachineRegistered {
        /// Machine identifier.
        machine: String,
    },
    /// A machine was removed from the scheduler.
    MachineRemoved {
        /// Machine identifier.
        machine: String,
    },
    /// A model input outside the input filter set was dropped.
    InputDropped {
        /// Kind of the dropped input.
        kind: String,
    },
    /// A system event outside the event filter set was dropped.
    EventDropped {
        /// Kind of the dropped event.
        kind: String,
    },
    /// A dequeued system event had no enabled refinement and was discarded.
    EventDiscarded {
        /// Kind of the discarded event.
        kind: String,
    },
    /// A dequeued model input had no enabled refinement; an error output was emitted.
    RefinementMissing {
        /// Kind of the unmatched input.
        kind: String,
    },
    /// A model output outside the output filter set was dropped.
    OutputDropped {
        /// Kind of the dropped output.
        kind: String,
    },
    /// A system command outside the command filter set was dropped.
    CommandDropped {
        /// Kind of the dropped command.
        kind: String,
    },
    /// A transition fired.
    TransitionFired {
        /// Machine identifier.
        machine: String,
        /// Source state.
        from: String,
        /// Target state.
        to: String,
        /// Keyed action kind.
        kind: String,
    },
    /// A model output was delivered toward the runner.
    OutputDispatched {
        /// Kind of the delivered output.
        kind: String,
    },
    /// A system command was delivered to the SUT executor.
    CommandDispatched {
        /// Kind of the delivered command.
        kind: String,
    },
}

// ============================================================================
// SECTION: Trace Sink
// ============================================================================

/// Receives scheduler trace records.
pub trait TraceSink: Send + Sync {
    /// Records one trace event. Implementations must not fail or block.
    fn record(&self, event: &TraceEvent);
}

impl<T: TraceSink + ?Sized> TraceSink for std::sync::Arc<T> {
    fn record(&self, event: &TraceEvent) {
        self.as_ref().record(event);
    }
}

// ============================================================================
// SECTION: Null Sink
// ============================================================================

/// Trace sink discarding every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn record(&self, _event: &TraceEvent) {}
}

// ============================================================================
// SECTION: Writer Sink
// ============================================================================

/// Trace sink writing one JSON record per line.
pub struct WriterTraceSink<W: Write + Send> {
    /// Output writer for trace records.
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterTraceSink<W> {
    /// Creates a writer-backed trace sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> TraceSink for WriterTraceSink<W> {
    fn record(&self, event: &TraceEvent) {
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *guard, event).is_err() {
            return;
        }
        let _newline = guard.write_all(b"\n");
    }
}
