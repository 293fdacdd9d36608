// crates/refinery-connect/src/wire.rs
// ============================================================================
// Module: Action Refinery Runner Wire Model
// Description: Wire-level action records and line framing for the runner link.
// Purpose: Represent runner traffic independently of socket handling.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The runner link is line-oriented: every line carries the textual encoding
//! of one model action, and the socket a line travels on determines its
//! channel and direction. [`TorxAction`] tags a line with both so the adapter
//! boundary can route it without re-inspecting socket state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Wire Direction
// ============================================================================

/// Direction of a wire action relative to the runner.
///
/// # Invariants
/// - Variants are stable for serialization and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireDirection {
    /// Action received from the runner (a model input).
    Input,
    /// Action produced toward the runner (a model output).
    Output,
}

// ============================================================================
// SECTION: Wire Action
// ============================================================================

/// One line of runner traffic tagged with channel and direction.
///
/// # Invariants
/// - `data` is a single line without the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorxAction {
    /// Direction relative to the runner.
    pub direction: WireDirection,
    /// Channel the line travels on.
    pub channel: String,
    /// Textual action encoding.
    pub data: String,
}

impl TorxAction {
    /// Creates an input-direction wire action.
    #[must_use]
    pub fn input(channel: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            direction: WireDirection::Input,
            channel: channel.into(),
            data: data.into(),
        }
    }

    /// Creates an output-direction wire action.
    #[must_use]
    pub fn output(channel: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            direction: WireDirection::Output,
            channel: channel.into(),
            data: data.into(),
        }
    }
}

// ============================================================================
// SECTION: Channel Binding
// ============================================================================

/// Socket binding pairing an input and an output channel on one port.
///
/// # Invariants
/// - `input_channel` names the channel the runner writes and the engine
///   consumes; `output_channel` the channel the engine answers on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// Channel carrying runner-to-engine traffic.
    pub input_channel: String,
    /// Channel carrying engine-to-runner traffic.
    pub output_channel: String,
    /// TCP port of the socket serving both channels.
    pub port: u16,
}

// ============================================================================
// SECTION: Line Framing
// ============================================================================

/// Strips the line terminator from a received raw line.
#[must_use]
pub fn decode_line(raw: &str) -> &str {
    raw.trim_end_matches(['\r', '\n'])
}

/// Frames action data as one transmitted line.
#[must_use]
pub fn encode_line(data: &str) -> String {
    format!("{data}\n")
}
