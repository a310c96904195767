//! Error types for call dispatch.

use thiserror::Error;

use crate::module::ModuleError;
use crate::value::{ParseValueTypeError, ValueType};

/// Errors that abort an `invoke`. Every failure is terminal for the call.
#[derive(Error, Debug)]
pub enum CallError {
    /// No module handle is bound to the bridge.
    #[error("No native module is bound")]
    ModuleUnavailable,

    /// The entry point is not exported by the module.
    #[error("Function {0} not found in native module")]
    UnknownEntry(String),

    /// A declared type token is not one of the supported names.
    #[error(transparent)]
    UnknownType(#[from] ParseValueTypeError),

    /// Argument count differs from the declared parameter count.
    #[error("Expected {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// An argument's runtime kind disagrees with its declared type.
    #[error("Argument {index} is not a valid {expected} (got {got})")]
    TypeMismatch {
        index: usize,
        expected: ValueType,
        got: &'static str,
    },

    /// The entry point returned nothing usable for the declared return type.
    #[error("Function {entry} did not return a value decodable as {expected}")]
    MissingReturn { entry: String, expected: ValueType },

    /// The module failed while encoding, executing or decoding.
    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl CallError {
    /// The argument index and expected type of a `TypeMismatch`.
    pub fn type_mismatch(&self) -> Option<(usize, ValueType)> {
        match self {
            CallError::TypeMismatch {
                index, expected, ..
            } => Some((*index, *expected)),
            _ => None,
        }
    }
}
