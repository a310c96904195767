//! WebAssembly execution of native modules.
//!
//! [`WasmModule`] instantiates a core WebAssembly module with wasmtime and
//! serves the [`NativeModule`](crate::module::NativeModule) contract from its
//! exports, so a [`Bridge`](crate::bridge::Bridge) can drive it directly.

mod error;
mod runner;

pub use error::WasmError;
pub use runner::WasmModule;
