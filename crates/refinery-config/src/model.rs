// crates/refinery-config/src/model.rs
// ============================================================================
// Module: Action Refinery Model File Parser
// Description: Channel binding discovery from the plain-text model file.
// Purpose: Map CLIENTSOCK channel declarations onto port-paired bindings.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The runner's model file declares its socket layout under a `CLIENTSOCK`
//! block: lines of the form `CHAN {IN|OUT} <channel-name> ... <port>`, closed
//! by `ENDDEF`. Every port must pair one `OUT` channel (the runner writes it,
//! so the engine consumes it) with one `IN` channel (the runner reads it, so
//! the engine answers on it). The parser is deliberately line-oriented and
//! ignores everything outside the block; full model syntax is out of scope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Parser Errors
// ============================================================================

/// Errors raised while scanning the model file for channel bindings.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// No `CLIENTSOCK` block was found.
    #[error("model file declares no CLIENTSOCK block")]
    MissingClientSock,
    /// A `CHAN` line inside the block is malformed.
    #[error("malformed CHAN declaration on line {line_no}: {line}")]
    MalformedChan {
        /// One-based line number.
        line_no: usize,
        /// Offending line text.
        line: String,
    },
    /// A `CHAN` line carries no parseable port number.
    #[error("CHAN declaration on line {line_no} has no port")]
    MissingPort {
        /// One-based line number.
        line_no: usize,
    },
    /// A port carries two channels of the same direction.
    #[error("port {port} declares a second {direction} channel")]
    DuplicateChannel {
        /// Conflicting port.
        port: u16,
        /// Direction keyword of the conflict.
        direction: &'static str,
    },
    /// A port is missing one of its two directions.
    #[error("port {0} is missing its IN or OUT channel")]
    UnpairedPort(u16),
}

// ============================================================================
// SECTION: Channel Pairs
// ============================================================================

/// Channel pair served by one runner socket.
///
/// # Invariants
/// - `input_channel` is the model's `CHAN OUT` declaration (runner writes,
///   engine consumes); `output_channel` is the model's `CHAN IN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPair {
    /// TCP port of the socket serving both channels.
    pub port: u16,
    /// Channel carrying runner-to-engine traffic.
    pub input_channel: String,
    /// Channel carrying engine-to-runner traffic.
    pub output_channel: String,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Accumulating slot for one port while scanning the block.
#[derive(Debug, Default, Clone)]
struct PortSlot {
    /// Channel declared `OUT` by the model (engine input).
    input_channel: Option<String>,
    /// Channel declared `IN` by the model (engine output).
    output_channel: Option<String>,
}

/// Parses the model file text into port-paired channel bindings.
///
/// # Errors
///
/// Returns [`ModelError`] when no `CLIENTSOCK` block exists, a `CHAN` line is
/// malformed, or a port does not pair exactly one `IN` and one `OUT` channel.
pub fn parse_model_channels(text: &str) -> Result<Vec<ChannelPair>, ModelError> {
    let mut in_block = false;
    let mut seen_block = false;
    let mut slots: BTreeMap<u16, PortSlot> = BTreeMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if !in_block {
            if line.contains("CLIENTSOCK") {
                in_block = true;
                seen_block = true;
            }
            continue;
        }
        if line.starts_with("ENDDEF") {
            in_block = false;
            continue;
        }
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("CHAN") {
            continue;
        }
        let direction = tokens.next().ok_or_else(|| ModelError::MalformedChan {
            line_no,
            line: line.to_string(),
        })?;
        let channel = tokens.next().ok_or_else(|| ModelError::MalformedChan {
            line_no,
            line: line.to_string(),
        })?;
        let port = last_port_token(line).ok_or(ModelError::MissingPort {
            line_no,
        })?;

        let slot = slots.entry(port).or_default();
        match direction {
            "OUT" => {
                if slot.input_channel.is_some() {
                    return Err(ModelError::DuplicateChannel {
                        port,
                        direction: "OUT",
                    });
                }
                slot.input_channel = Some(channel.to_string());
            }
            "IN" => {
                if slot.output_channel.is_some() {
                    return Err(ModelError::DuplicateChannel {
                        port,
                        direction: "IN",
                    });
                }
                slot.output_channel = Some(channel.to_string());
            }
            _ => {
                return Err(ModelError::MalformedChan {
                    line_no,
                    line: line.to_string(),
                });
            }
        }
    }

    if !seen_block {
        return Err(ModelError::MissingClientSock);
    }

    let mut pairs = Vec::with_capacity(slots.len());
    for (port, slot) in slots {
        let (Some(input_channel), Some(output_channel)) =
            (slot.input_channel, slot.output_channel)
        else {
            return Err(ModelError::UnpairedPort(port));
        };
        pairs.push(ChannelPair {
            port,
            input_channel,
            output_channel,
        });
    }
    Ok(pairs)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the last numeric token of a line as a port, if any.
fn last_port_token(line: &str) -> Option<u16> {
    line.split_whitespace().rev().find_map(|token| token.parse::<u16>().ok())
}
