// crates/refinery-core/src/core/variables.rs
// ============================================================================
// Module: Action Refinery Variable Store
// Description: Named, type-pinned local variables for symbolic machines.
// Purpose: Hold per-machine refinement state read and mutated by hooks.
// Dependencies: crate::core::action, thiserror
// ============================================================================

//! ## Overview
//! Each symbolic machine owns exactly one variable store; it is never shared.
//! A name, once bound, keeps its type for the lifetime of the binding:
//! rebinding with the same type overwrites the value, rebinding with a
//! different type fails, and reads must agree with the stored type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::action::FieldType;
use crate::core::action::FieldValue;

// ============================================================================
// SECTION: Variable Errors
// ============================================================================

/// Errors raised by variable store operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A failed operation leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    /// Variable name is empty.
    #[error("variable name is empty")]
    EmptyName,
    /// Requested or rebinding type disagrees with the stored binding.
    #[error("variable {name} is bound as {bound}, requested {requested}")]
    TypeMismatch {
        /// Variable name.
        name: String,
        /// Type of the existing binding.
        bound: FieldType,
        /// Type requested by the caller.
        requested: FieldType,
    },
    /// Variable is not bound.
    #[error("variable is not bound: {0}")]
    Unbound(String),
}

// ============================================================================
// SECTION: Variable Store
// ============================================================================

/// Named, type-pinned variable store owned by one symbolic machine.
///
/// # Invariants
/// - A bound name retains its [`FieldType`] until cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    /// Bindings keyed by variable name.
    bindings: BTreeMap<String, FieldValue>,
}

impl VariableStore {
    /// Creates an empty variable store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds or updates a variable.
    ///
    /// Rebinding with the same type (including the identical value) succeeds;
    /// rebinding with a different type fails and leaves the binding intact.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::EmptyName`] for an empty name and
    /// [`VariableError::TypeMismatch`] when the name is pinned to another type.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), VariableError> {
        if name.is_empty() {
            return Err(VariableError::EmptyName);
        }
        if let Some(existing) = self.bindings.get(name)
            && existing.field_type() != value.field_type()
        {
            return Err(VariableError::TypeMismatch {
                name: name.to_string(),
                bound: existing.field_type(),
                requested: value.field_type(),
            });
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds or updates a boolean variable.
    ///
    /// # Errors
    ///
    /// Propagates [`VariableError`] from [`Self::set`].
    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), VariableError> {
        self.set(name, FieldValue::Bool(value))
    }

    /// Binds or updates an integer variable.
    ///
    /// # Errors
    ///
    /// Propagates [`VariableError`] from [`Self::set`].
    pub fn set_int(&mut self, name: &str, value: i64) -> Result<(), VariableError> {
        self.set(name, FieldValue::Int(value))
    }

    /// Binds or updates a string variable.
    ///
    /// # Errors
    ///
    /// Propagates [`VariableError`] from [`Self::set`].
    pub fn set_str(&mut self, name: &str, value: impl Into<String>) -> Result<(), VariableError> {
        self.set(name, FieldValue::Str(value.into()))
    }

    /// Returns the raw binding for a name.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::Unbound`] when the name is not bound.
    pub fn get(&self, name: &str) -> Result<&FieldValue, VariableError> {
        self.bindings.get(name).ok_or_else(|| VariableError::Unbound(name.to_string()))
    }

    /// Reads a boolean variable.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::Unbound`] when unset and
    /// [`VariableError::TypeMismatch`] when bound to another type.
    pub fn get_bool(&self, name: &str) -> Result<bool, VariableError> {
        match self.get(name)? {
            FieldValue::Bool(value) => Ok(*value),
            other => Err(Self::mismatch(name, other.field_type(), FieldType::Bool)),
        }
    }

    /// Reads an integer variable.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::Unbound`] when unset and
    /// [`VariableError::TypeMismatch`] when bound to another type.
    pub fn get_int(&self, name: &str) -> Result<i64, VariableError> {
        match self.get(name)? {
            FieldValue::Int(value) => Ok(*value),
            other => Err(Self::mismatch(name, other.field_type(), FieldType::Int)),
        }
    }

    /// Reads a string variable.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::Unbound`] when unset and
    /// [`VariableError::TypeMismatch`] when bound to another type.
    pub fn get_str(&self, name: &str) -> Result<&str, VariableError> {
        match self.get(name)? {
            FieldValue::Str(value) => Ok(value.as_str()),
            other => Err(Self::mismatch(name, other.field_type(), FieldType::Str)),
        }
    }

    /// Removes a binding.
    ///
    /// # Errors
    ///
    /// Returns [`VariableError::Unbound`] when the name is not bound.
    pub fn clear(&mut self, name: &str) -> Result<(), VariableError> {
        if self.bindings.remove(name).is_none() {
            return Err(VariableError::Unbound(name.to_string()));
        }
        Ok(())
    }

    /// Returns the pinned type of a binding, if present.
    #[must_use]
    pub fn binding_type(&self, name: &str) -> Option<FieldType> {
        self.bindings.get(name).map(FieldValue::field_type)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true when no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Builds a type-mismatch error for a read or rebind.
    fn mismatch(name: &str, bound: FieldType, requested: FieldType) -> VariableError {
        VariableError::TypeMismatch {
            name: name.to_string(),
            bound,
            requested,
        }
    }
}
