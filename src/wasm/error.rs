//! Error types for WebAssembly module loading and execution.

use thiserror::Error;

/// Errors that can occur while loading or driving a WebAssembly module.
#[derive(Error, Debug)]
pub enum WasmError {
    /// Failed to read the WebAssembly module file.
    #[error("Failed to load wasm module: {0}")]
    ModuleLoad(#[from] std::io::Error),

    /// Wasmtime engine, compilation or instantiation error.
    #[error("Wasmtime error: {0}")]
    Wasmtime(#[from] wasmtime::Error),

    /// A primitive or the linear memory is not exported.
    #[error("Required export not found in module: {0}")]
    MissingExport(String),

    /// An exported function's arity disagrees with the call.
    #[error("Invalid function signature for '{name}': expected {expected} parameters, got {actual}")]
    InvalidSignature {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A parameter or result type other than `i32` or `f32`.
    #[error("Unsupported value type {ty} in function '{name}'")]
    UnsupportedValType { name: String, ty: String },
}
