// crates/refinery-core/src/core/codec.rs
// ============================================================================
// Module: Action Refinery Model Action Codec
// Description: Bidirectional textual encoding for model actions.
// Purpose: Render and recover model actions on the runner wire.
// Dependencies: crate::core::{action, identifiers}, serde_json
// ============================================================================

//! ## Overview
//! A model action encodes as its kind name followed, when fields are present,
//! by one space and a JSON object of the primitive fields. The kind name is
//! the leading token, so decoding recovers the concrete kind without any
//! registry lookup, and the field types are recovered from the JSON literal
//! forms. Round-trip identity holds for every well-formed action.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::action::FieldValue;
use crate::core::action::ModelAction;
use crate::core::identifiers::ActionKind;

// ============================================================================
// SECTION: Codec Errors
// ============================================================================

/// Errors raised while encoding or decoding model actions.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Wire text is empty or whitespace-only.
    #[error("action text is empty")]
    EmptyText,
    /// Leading kind token is not a valid kind name.
    #[error("invalid action kind token: {0}")]
    InvalidKind(String),
    /// Field object failed to parse or contained a non-primitive value.
    #[error("invalid action fields: {0}")]
    InvalidFields(String),
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes a model action into its textual wire form.
///
/// Field serialization cannot fail: field values are JSON-representable
/// primitives and the map keys are strings.
#[must_use]
pub fn encode_action(action: &ModelAction) -> String {
    if action.fields.is_empty() {
        return action.kind.as_str().to_string();
    }
    let fields = serde_json::to_string(&action.fields).unwrap_or_else(|_| "{}".to_string());
    format!("{} {fields}", action.kind)
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a model action from its textual wire form.
///
/// # Errors
///
/// Returns [`CodecError`] when the kind token is malformed, the field object
/// does not parse, or a field value falls outside the primitive set.
pub fn decode_action(text: &str) -> Result<ModelAction, CodecError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CodecError::EmptyText);
    }

    let (token, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim_start()),
        None => (trimmed, ""),
    };

    if !is_kind_token(token) {
        return Err(CodecError::InvalidKind(token.to_string()));
    }

    let fields: BTreeMap<String, FieldValue> = if rest.is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(rest).map_err(|err| CodecError::InvalidFields(err.to_string()))?
    };

    Ok(ModelAction {
        kind: ActionKind::new(token),
        fields,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when the token is a well-formed kind name.
fn is_kind_token(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
