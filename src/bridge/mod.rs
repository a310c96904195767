//! Call dispatch between host callers and a native module.
//!
//! [`Bridge::invoke`] enforces the declared calling convention of an entry
//! point: it validates every argument against its declared type, encodes
//! strings and arrays into the module's linear memory, calls the entry point
//! with primitive arguments, and decodes the first declared return type back
//! into a [`HostValue`].
//!
//! # Example
//!
//! ```
//! use native_bridge::bridge::Bridge;
//! use native_bridge::module::{RawValue, SimulatedModule};
//! use native_bridge::HostValue;
//!
//! let module = SimulatedModule::new().with_entry("add", |_memory, args| {
//!     let sum = args.iter().map(|a| a.as_i32()).sum();
//!     Ok(Some(RawValue::I32(sum)))
//! });
//! let mut bridge = Bridge::new(module);
//!
//! let args = vec![HostValue::Int(2), HostValue::Int(3)];
//! let sum = bridge.invoke("add", &["int", "int"], &["int"], args)?;
//! assert_eq!(sum, HostValue::Int(5));
//! # Ok::<(), native_bridge::bridge::CallError>(())
//! ```

mod error;
mod signature;

pub use error::CallError;
pub use signature::{Signature, declared_return};

use signature::{Checked, check};

use crate::abi::{Pointer, decode_array, decode_string, encode_array, encode_string};
use crate::logging::debug;
use crate::module::{NativeModule, RawValue};
use crate::value::{HostValue, ValueType};

/// Dispatcher bound to at most one module instance.
///
/// The bridge holds no memory of its own. Calls against one instance must not
/// overlap; `invoke` takes `&mut self` so the borrow checker serializes them.
pub struct Bridge<M> {
    module: Option<M>,
}

impl<M> Default for Bridge<M> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<M> Bridge<M> {
    /// Create a bridge with no module; every call fails with `ModuleUnavailable`.
    pub fn unbound() -> Self {
        Self { module: None }
    }
}

impl<M: NativeModule> Bridge<M> {
    /// Create a bridge bound to `module`.
    pub fn new(module: M) -> Self {
        Self {
            module: Some(module),
        }
    }

    /// Bind a module, returning the previously bound one.
    pub fn bind(&mut self, module: M) -> Option<M> {
        self.module.replace(module)
    }

    pub fn unbind(&mut self) -> Option<M> {
        self.module.take()
    }

    pub fn is_bound(&self) -> bool {
        self.module.is_some()
    }

    pub fn module(&self) -> Option<&M> {
        self.module.as_ref()
    }

    pub fn module_mut(&mut self) -> Option<&mut M> {
        self.module.as_mut()
    }

    pub fn into_module(self) -> Option<M> {
        self.module
    }

    /// Invoke `entry` with declared type tokens, e.g. `&["string", "int"]`.
    pub fn invoke(
        &mut self,
        entry: &str,
        param_types: &[&str],
        return_types: &[&str],
        args: Vec<HostValue>,
    ) -> Result<HostValue, CallError> {
        let module = self.bound_entry(entry)?;
        let signature = Signature::parse(param_types, return_types)?;
        call(module, entry, &signature, &args)
    }

    /// Invoke `entry` with an already parsed signature.
    pub fn invoke_signature(
        &mut self,
        entry: &str,
        signature: &Signature,
        args: Vec<HostValue>,
    ) -> Result<HostValue, CallError> {
        let module = self.bound_entry(entry)?;
        call(module, entry, signature, &args)
    }

    fn bound_entry(&mut self, entry: &str) -> Result<&mut M, CallError> {
        let module = self.module.as_mut().ok_or(CallError::ModuleUnavailable)?;
        if !module.has_entry(entry) {
            return Err(CallError::UnknownEntry(entry.to_string()));
        }
        Ok(module)
    }
}

fn call<M: NativeModule + ?Sized>(
    module: &mut M,
    entry: &str,
    signature: &Signature,
    args: &[HostValue],
) -> Result<HostValue, CallError> {
    if args.len() != signature.params.len() {
        return Err(CallError::ArityMismatch {
            expected: signature.params.len(),
            got: args.len(),
        });
    }

    // validate everything before touching module memory
    let checked = signature
        .params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (ty, value))| check(index, *ty, value))
        .collect::<Result<Vec<_>, _>>()?;

    let mut raw_args = Vec::with_capacity(checked.len());
    for arg in checked {
        let raw = match arg {
            Checked::Raw(raw) => raw,
            Checked::String(s) => RawValue::I32(encode_string(module, s)?.as_i32()),
            Checked::Array(items) => RawValue::I32(encode_array(module, items)?.as_i32()),
        };
        raw_args.push(raw);
    }

    debug!(entry, signature = %signature, "invoking entry point");
    let result = module.call_entry(entry, &raw_args)?;
    let value = decode_return(module, entry, signature.return_type(), result)?;
    debug!(entry, result = %value, "entry point returned");
    Ok(value)
}

fn decode_return<M: NativeModule + ?Sized>(
    module: &mut M,
    entry: &str,
    return_type: Option<ValueType>,
    result: Option<RawValue>,
) -> Result<HostValue, CallError> {
    let missing = |expected| CallError::MissingReturn {
        entry: entry.to_string(),
        expected,
    };

    match (return_type, result) {
        (Some(ValueType::String), Some(RawValue::I32(ptr))) => {
            Ok(HostValue::String(decode_string(module, Pointer::from_i32(ptr))?))
        }
        (Some(ValueType::Array), Some(RawValue::I32(ptr))) => {
            Ok(HostValue::Array(decode_array(module, Pointer::from_i32(ptr))?))
        }
        (Some(ValueType::Bool), Some(raw)) => Ok(HostValue::Bool(raw.is_nonzero())),
        (Some(ty @ (ValueType::String | ValueType::Array | ValueType::Bool)), _) => Err(missing(ty)),
        (_, Some(RawValue::I32(v))) => Ok(HostValue::Int(v)),
        (_, Some(RawValue::F32(v))) => Ok(HostValue::Float(v)),
        (_, None) => Ok(HostValue::Null),
    }
}
