//! Marshalling bridge between dynamic host values and a native module.
//!
//! A native module owns a linear memory and exports primitives for building
//! length-prefixed strings and tagged-slot arrays inside it. The [`Bridge`]
//! validates host arguments against a declared signature, encodes them through
//! those primitives, calls the entry point, and decodes the result.
//!
//! # Quick Start
//!
//! ```ignore
//! use native_bridge::prelude::*;
//!
//! let module = WasmModule::from_file("native.wasm")?;
//! let mut bridge = Bridge::new(module);
//!
//! let greeting = bridge.invoke("greet", &["string"], &["string"], vec!["world".into()])?;
//! assert_eq!(greeting, HostValue::from("hello, world"));
//! ```
//!
//! # Modules
//!
//! - [`abi`] - Memory layout of strings and arrays, encoder and decoder
//! - [`module`] - The primitive contract and an in-process simulated module
//! - [`bridge`] - Signature validation and call dispatch
//! - [`value`] - Dynamic host values and declared type names
//! - [`wasm`] - WebAssembly execution with wasmtime (requires `wasm` feature)
//! - [`config`] - TOML manifest of entry signatures (requires `config` feature)
//!
//! # Feature Flags
//!
//! - `wasm` - Run core WebAssembly modules (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `json` - Convert between JSON and host values
//! - `config` - Load entry signatures from a TOML manifest
//! - `cli` - Enable the command-line interface binary
//! - `full` - Enable all features

pub mod abi;
pub mod bridge;
#[cfg(feature = "config")]
pub mod config;
mod logging;
pub mod module;
pub mod prelude;
pub mod value;
#[cfg(feature = "wasm")]
pub mod wasm;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use abi::{AbiError, LinearMemory, Pointer, TypeTag};
pub use bridge::{Bridge, CallError, Signature};
pub use module::{ModuleError, NativeModule, RawValue, SimulatedModule};
pub use value::{HostValue, ParseValueTypeError, ValueType};

#[cfg(feature = "json")]
pub use value::ValueError;

#[cfg(feature = "config")]
pub use config::{ConfigError, Manifest};

#[cfg(feature = "wasm")]
pub use wasm::{WasmError, WasmModule};
