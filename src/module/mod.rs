//! The contract between the bridge and an execution module.
//!
//! A module owns a linear memory and its allocator, exports a fixed set of
//! primitives for building strings and arrays in that memory, and exports the
//! named entry points that callers invoke. The bridge only ever touches the
//! memory through these primitives, except for reading bytes while decoding.
//!
//! Two implementations ship with the crate:
//!
//! - [`SimulatedModule`]: host-side memory and closure entry points
//! - `WasmModule` (feature `wasm`): a core WebAssembly module run by wasmtime

mod error;
mod simulated;

pub use error::ModuleError;
pub use simulated::{EntryFn, SimulatedModule};

use crate::abi::Pointer;

/// Export names of the module primitives.
pub mod names {
    pub const STR_ALLOC: &str = "__str_alloc";
    pub const STR_STORE_LEN: &str = "__str_store_len";
    pub const STR_STORE_BYTE: &str = "__str_store_byte";
    pub const STR_GET_LEN: &str = "__str_get_len";
    pub const ARR_ALLOC: &str = "__arr_alloc";
    pub const ARR_STORE_LEN: &str = "__arr_store_len";
    pub const ARR_STORE_CAP: &str = "__arr_store_cap";
    pub const ARR_PUSH_INT: &str = "__arr_push_int";
    pub const ARR_PUSH_FLOAT: &str = "__arr_push_float";
    pub const ARR_PUSH_STRING: &str = "__arr_push_string";
    pub const ARR_PUSH_ARRAY: &str = "__arr_push_array";
    pub const ARR_GET_LEN: &str = "__arr_get_len";
    pub const MEMORY: &str = "memory";

    /// Every primitive a module must export.
    pub const PRIMITIVES: [&str; 12] = [
        STR_ALLOC,
        STR_STORE_LEN,
        STR_STORE_BYTE,
        STR_GET_LEN,
        ARR_ALLOC,
        ARR_STORE_LEN,
        ARR_STORE_CAP,
        ARR_PUSH_INT,
        ARR_PUSH_FLOAT,
        ARR_PUSH_STRING,
        ARR_PUSH_ARRAY,
        ARR_GET_LEN,
    ];
}

/// A primitive value as passed to and returned from entry points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    I32(i32),
    F32(f32),
}

impl RawValue {
    /// The value as an `i32`; floats truncate toward zero, saturating at the bounds.
    pub fn as_i32(self) -> i32 {
        match self {
            RawValue::I32(v) => v,
            RawValue::F32(v) => v as i32,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            RawValue::I32(v) => v as f32,
            RawValue::F32(v) => v,
        }
    }

    pub fn is_nonzero(self) -> bool {
        match self {
            RawValue::I32(v) => v != 0,
            RawValue::F32(v) => v != 0.0,
        }
    }
}

/// Primitives and entry points exported by an execution module.
///
/// Implementations are single-threaded: every method runs to completion and
/// callers must not interleave calls from several contexts on one instance.
pub trait NativeModule {
    /// Whether `name` is an exported entry point.
    fn has_entry(&self, name: &str) -> bool;

    /// Invoke an entry point. Returns the first result, or `None` for void functions.
    fn call_entry(
        &mut self,
        name: &str,
        args: &[RawValue],
    ) -> Result<Option<RawValue>, ModuleError>;

    /// A byte view of the whole linear memory.
    fn memory(&self) -> &[u8];

    /// Reserve a string region for `byte_len` bytes.
    fn str_alloc(&mut self, byte_len: u32) -> Result<Pointer, ModuleError>;

    fn str_store_len(&mut self, ptr: Pointer, len: u32) -> Result<(), ModuleError>;

    /// Write one content byte; `offset` is relative to the region start, header included.
    fn str_store_byte(&mut self, ptr: Pointer, offset: u32, byte: u8) -> Result<(), ModuleError>;

    fn str_get_len(&mut self, ptr: Pointer) -> Result<u32, ModuleError>;

    /// Reserve an array region with room for `capacity` slots.
    fn arr_alloc(&mut self, capacity: u32) -> Result<Pointer, ModuleError>;

    fn arr_store_len(&mut self, ptr: Pointer, len: u32) -> Result<(), ModuleError>;

    fn arr_store_cap(&mut self, ptr: Pointer, capacity: u32) -> Result<(), ModuleError>;

    /// Append an `Int32` slot at index `len` and bump the length header.
    fn arr_push_int(&mut self, ptr: Pointer, value: i32) -> Result<(), ModuleError>;

    fn arr_push_float(&mut self, ptr: Pointer, value: f32) -> Result<(), ModuleError>;

    fn arr_push_string(&mut self, ptr: Pointer, string: Pointer) -> Result<(), ModuleError>;

    fn arr_push_array(&mut self, ptr: Pointer, array: Pointer) -> Result<(), ModuleError>;

    fn arr_get_len(&mut self, ptr: Pointer) -> Result<u32, ModuleError>;
}
