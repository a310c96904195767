//! Convenient re-exports for common usage patterns.
//!
//! ```ignore
//! use native_bridge::prelude::*;
//!
//! let mut bridge = Bridge::new(WasmModule::from_file("native.wasm")?);
//! let sum = bridge.invoke("sum", &["array"], &["int"], vec![vec![1, 2, 3].into()])?;
//! ```

pub use crate::error::{Error, Result};

pub use crate::bridge::{Bridge, CallError, Signature};
pub use crate::module::{ModuleError, NativeModule, RawValue, SimulatedModule};
pub use crate::value::{HostValue, ValueType};

#[cfg(feature = "config")]
pub use crate::config::Manifest;

#[cfg(feature = "wasm")]
pub use crate::wasm::{WasmError, WasmModule};
