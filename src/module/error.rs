//! Error types for module primitive and entry point calls.

use thiserror::Error;

use crate::abi::AbiError;
#[cfg(feature = "wasm")]
use crate::wasm::WasmError;

/// Errors raised by an execution module while serving the bridge.
#[derive(Error, Debug)]
pub enum ModuleError {
    /// A primitive touched memory outside its region.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The named function is not exported by the module.
    #[error("Function not found in module: {0}")]
    EntryNotFound(String),

    /// Execution trapped (runtime error inside the module).
    #[error("Execution trapped in '{name}': {message}")]
    Trap { name: String, message: String },

    /// A primitive returned something other than what the contract requires.
    #[error("'{name}' returned an unexpected result: expected {expected}")]
    UnexpectedResult { name: String, expected: String },

    /// WebAssembly engine error.
    #[cfg(feature = "wasm")]
    #[error(transparent)]
    Wasm(#[from] WasmError),
}
