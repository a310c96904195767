//! Unified error type for the native-bridge library.
//!
//! This module provides a single [`Error`] type that encompasses all errors
//! that can occur in the library, making it easier to handle errors in
//! application code.

use thiserror::Error;

use crate::abi::AbiError;
use crate::bridge::CallError;
#[cfg(feature = "config")]
use crate::config::ConfigError;
use crate::module::ModuleError;
#[cfg(feature = "json")]
use crate::value::ValueError;
#[cfg(feature = "wasm")]
use crate::wasm::WasmError;

/// Unified error type for all native-bridge operations.
///
/// # Example
///
/// ```ignore
/// use native_bridge::{Bridge, Result, WasmModule};
///
/// fn greet(path: &str) -> Result<()> {
///     let mut bridge = Bridge::new(WasmModule::from_file(path)?);
///     bridge.invoke("greet", &["string"], &["string"], vec!["world".into()])?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Memory layout violation.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Primitive or entry point failure.
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// Call dispatch failure.
    #[error(transparent)]
    Call(#[from] CallError),

    /// Error from WebAssembly module loading or execution.
    #[cfg(feature = "wasm")]
    #[error(transparent)]
    Wasm(#[from] WasmError),

    /// JSON to host value conversion error.
    #[cfg(feature = "json")]
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Manifest loading error.
    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is an ABI error.
    pub fn is_abi(&self) -> bool {
        matches!(self, Self::Abi(_))
    }

    /// Returns `true` if this is a module error.
    pub fn is_module(&self) -> bool {
        matches!(self, Self::Module(_))
    }

    /// Returns `true` if this is a call dispatch error.
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }

    /// Returns `true` if this is a WASM execution error.
    #[cfg(feature = "wasm")]
    pub fn is_wasm(&self) -> bool {
        matches!(self, Self::Wasm(_))
    }

    /// Returns `true` if this is a manifest error.
    #[cfg(feature = "config")]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let err: Error = CallError::ModuleUnavailable.into();
        assert!(err.is_call());
        assert!(!err.is_abi());
        assert_eq!(err.to_string(), "No native module is bound");

        let err: Error = AbiError::PointerOverflow { base: 4 }.into();
        assert!(err.is_abi());

        let err: Error = ModuleError::EntryNotFound("f".into()).into();
        assert!(err.is_module());
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_manifest_read_failure_is_a_config_error() {
        fn load(path: &str) -> Result<crate::config::Manifest> {
            Ok(crate::config::Manifest::from_file(path)?)
        }
        let err = load("/nonexistent/bridge.toml").unwrap_err();
        assert!(err.is_config());
        assert!(matches!(err, Error::Config(ConfigError::Io(..))));
    }
}
