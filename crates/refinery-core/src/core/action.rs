// crates/refinery-core/src/core/action.rs
// ============================================================================
// Module: Action Refinery Action Taxonomy
// Description: Model and system actions with typed payloads and kind identity.
// Purpose: Provide the canonical action values exchanged with runner and SUT.
// Dependencies: crate::core::identifiers, serde, serde_json
// ============================================================================

//! ## Overview
//! Every value crossing the engine boundary is an [`Action`]: a *model
//! action* in the vocabulary of the test runner, with primitive typed fields,
//! or a *system action* in the vocabulary of the SUT, whose payload the
//! engine never interprets. Both carry an [`ActionKind`] identity used for
//! candidate matching and filter-set membership.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ActionKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved model-output kind reporting a refinement miss to the runner.
pub const REFINEMENT_ERROR_KIND: &str = "Error";

/// Field name carrying the unmatched input kind on a refinement-error output.
pub const REFINEMENT_ERROR_INPUT_FIELD: &str = "input";

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// Primitive field type supported by model actions and variable stores.
///
/// # Invariants
/// - Variants are stable for serialization and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Boolean field.
    Bool,
    /// Signed 64-bit integer field.
    Int,
    /// UTF-8 string field.
    Str,
}

impl FieldType {
    /// Returns a stable label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Str => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged primitive value carried by model-action fields and variables.
///
/// # Invariants
/// - The untagged serde form maps exactly onto JSON booleans, integers, and strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer value.
    Int(i64),
    /// UTF-8 string value.
    Str(String),
}

impl FieldValue {
    /// Returns the type tag of this value.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Bool(_) => FieldType::Bool,
            Self::Int(_) => FieldType::Int,
            Self::Str(_) => FieldType::Str,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

// ============================================================================
// SECTION: Action Domains and Classes
// ============================================================================

/// Vocabulary an action belongs to.
///
/// # Invariants
/// - Variants are stable for serialization and filter classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionDomain {
    /// Runner vocabulary: serializable typed payload.
    Model,
    /// SUT vocabulary: payload opaque to the engine.
    System,
}

/// Four-way action classification used by the scheduler filter sets.
///
/// The class is the product of the transition flavor (reactive consumes,
/// proactive produces) and the action domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionClass {
    /// Reactive on a model kind: a runner input the engine consumes.
    ModelInput,
    /// Proactive on a model kind: a runner output the engine produces.
    ModelOutput,
    /// Proactive on a system kind: a SUT command the engine produces.
    SystemCommand,
    /// Reactive on a system kind: a SUT event the engine consumes.
    SystemEvent,
}

// ============================================================================
// SECTION: Model Actions
// ============================================================================

/// Action in the runner vocabulary with primitive typed fields.
///
/// # Invariants
/// - Field values are restricted to the [`FieldValue`] primitives.
/// - Field order is canonical (name-sorted) for deterministic encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAction {
    /// Action-kind identity.
    pub kind: ActionKind,
    /// Named primitive fields.
    pub fields: BTreeMap<String, FieldValue>,
}

impl ModelAction {
    /// Creates a model action with no fields.
    #[must_use]
    pub fn new(kind: impl Into<ActionKind>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a boolean field.
    #[must_use]
    pub fn with_bool(mut self, name: impl Into<String>, value: bool) -> Self {
        self.fields.insert(name.into(), FieldValue::Bool(value));
        self
    }

    /// Adds an integer field.
    #[must_use]
    pub fn with_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.insert(name.into(), FieldValue::Int(value));
        self
    }

    /// Adds a string field.
    #[must_use]
    pub fn with_str(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), FieldValue::Str(value.into()));
        self
    }

    /// Returns a field value by name, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Builds the reserved refinement-error output for an unmatched input.
    #[must_use]
    pub fn refinement_error(unmatched: &ActionKind) -> Self {
        Self::new(REFINEMENT_ERROR_KIND)
            .with_str(REFINEMENT_ERROR_INPUT_FIELD, unmatched.as_str())
    }

    /// Returns true when this is the reserved refinement-error output.
    #[must_use]
    pub fn is_refinement_error(&self) -> bool {
        self.kind.as_str() == REFINEMENT_ERROR_KIND
    }
}

// ============================================================================
// SECTION: System Actions
// ============================================================================

/// Action in the SUT vocabulary with an engine-opaque payload.
///
/// # Invariants
/// - The payload is never interpreted by the engine; only `kind` takes part
///   in candidate matching and filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAction {
    /// Action-kind identity.
    pub kind: ActionKind,
    /// Optional opaque payload handed through to the embedder.
    pub payload: Option<Value>,
}

impl SystemAction {
    /// Creates a system action without payload.
    #[must_use]
    pub fn new(kind: impl Into<ActionKind>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Creates a system action carrying an opaque payload.
    #[must_use]
    pub fn with_payload(kind: impl Into<ActionKind>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload: Some(payload),
        }
    }
}

// ============================================================================
// SECTION: Action Union
// ============================================================================

/// Value exchanged with either the runner or the SUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum Action {
    /// Runner-vocabulary action.
    Model(ModelAction),
    /// SUT-vocabulary action.
    System(SystemAction),
}

impl Action {
    /// Returns the action-kind identity.
    #[must_use]
    pub const fn kind(&self) -> &ActionKind {
        match self {
            Self::Model(action) => &action.kind,
            Self::System(action) => &action.kind,
        }
    }

    /// Returns the vocabulary this action belongs to.
    #[must_use]
    pub const fn domain(&self) -> ActionDomain {
        match self {
            Self::Model(_) => ActionDomain::Model,
            Self::System(_) => ActionDomain::System,
        }
    }
}

impl From<ModelAction> for Action {
    fn from(action: ModelAction) -> Self {
        Self::Model(action)
    }
}

impl From<SystemAction> for Action {
    fn from(action: SystemAction) -> Self {
        Self::System(action)
    }
}
