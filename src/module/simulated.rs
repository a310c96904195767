//! An execution module implemented on the host.
//!
//! `SimulatedModule` keeps its linear memory in a [`LinearMemory`] and serves
//! the primitives with the same layout and append semantics as the native
//! builtins, so callers can be exercised without a WebAssembly engine.
//!
//! ## Example
//!
//! ```
//! use native_bridge::module::{RawValue, SimulatedModule};
//!
//! let module = SimulatedModule::new().with_entry("add", |_memory, args| {
//!     let sum = args.iter().map(|a| a.as_i32()).sum();
//!     Ok(Some(RawValue::I32(sum)))
//! });
//! ```

use std::collections::HashMap;

use super::{ModuleError, NativeModule, RawValue};
use crate::abi::{
    ARRAY_CAPACITY_OFFSET, AbiError, LinearMemory, Pointer, SLOT_VALUE_OFFSET, TypeTag,
    array_region_size, slot_offset, string_region_size,
};

/// A host closure serving as an entry point.
pub type EntryFn =
    Box<dyn FnMut(&mut LinearMemory, &[RawValue]) -> Result<Option<RawValue>, AbiError>>;

/// Host-side implementation of the module contract.
#[derive(Default)]
pub struct SimulatedModule {
    memory: LinearMemory,
    entries: HashMap<String, EntryFn>,
}

impl SimulatedModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing memory image.
    pub fn with_memory(memory: LinearMemory) -> Self {
        Self {
            memory,
            entries: HashMap::new(),
        }
    }

    /// Register an entry point, builder style.
    pub fn with_entry<F>(mut self, name: impl Into<String>, entry: F) -> Self
    where
        F: FnMut(&mut LinearMemory, &[RawValue]) -> Result<Option<RawValue>, AbiError> + 'static,
    {
        self.register(name, entry);
        self
    }

    /// Register (or replace) an entry point.
    pub fn register<F>(&mut self, name: impl Into<String>, entry: F)
    where
        F: FnMut(&mut LinearMemory, &[RawValue]) -> Result<Option<RawValue>, AbiError> + 'static,
    {
        self.entries.insert(name.into(), Box::new(entry));
    }

    /// Names of the registered entry points, sorted.
    pub fn entry_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn linear_memory(&self) -> &LinearMemory {
        &self.memory
    }

    pub fn linear_memory_mut(&mut self) -> &mut LinearMemory {
        &mut self.memory
    }

    fn push(&mut self, ptr: Pointer, tag: TypeTag, value: u32) -> Result<(), ModuleError> {
        let len = self.memory.read_u32(ptr.offset())?;
        let capacity = self.memory.read_u32(capacity_word(ptr)?)?;
        if len >= capacity {
            return Err(AbiError::CapacityExceeded {
                ptr: ptr.offset(),
                capacity,
            }
            .into());
        }
        let at = slot_offset(ptr, len)?;
        self.memory.write_u32(at, tag.as_u32())?;
        self.memory.write_u32(value_word(at)?, value)?;
        self.memory.write_u32(ptr.offset(), len + 1)?;
        Ok(())
    }
}

fn capacity_word(ptr: Pointer) -> Result<u32, AbiError> {
    ptr.offset()
        .checked_add(ARRAY_CAPACITY_OFFSET)
        .ok_or(AbiError::PointerOverflow { base: ptr.offset() })
}

fn value_word(slot: u32) -> Result<u32, AbiError> {
    slot.checked_add(SLOT_VALUE_OFFSET)
        .ok_or(AbiError::PointerOverflow { base: slot })
}

impl NativeModule for SimulatedModule {
    fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn call_entry(
        &mut self,
        name: &str,
        args: &[RawValue],
    ) -> Result<Option<RawValue>, ModuleError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| ModuleError::EntryNotFound(name.to_string()))?;
        entry(&mut self.memory, args).map_err(|e| ModuleError::Trap {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    fn memory(&self) -> &[u8] {
        self.memory.as_bytes()
    }

    fn str_alloc(&mut self, byte_len: u32) -> Result<Pointer, ModuleError> {
        Ok(self.memory.alloc(string_region_size(byte_len)?)?)
    }

    fn str_store_len(&mut self, ptr: Pointer, len: u32) -> Result<(), ModuleError> {
        Ok(self.memory.write_u32(ptr.offset(), len)?)
    }

    fn str_store_byte(&mut self, ptr: Pointer, offset: u32, byte: u8) -> Result<(), ModuleError> {
        let at = ptr
            .offset()
            .checked_add(offset)
            .ok_or(AbiError::PointerOverflow { base: ptr.offset() })?;
        Ok(self.memory.write(at, &[byte])?)
    }

    fn str_get_len(&mut self, ptr: Pointer) -> Result<u32, ModuleError> {
        Ok(self.memory.read_u32(ptr.offset())?)
    }

    fn arr_alloc(&mut self, capacity: u32) -> Result<Pointer, ModuleError> {
        Ok(self.memory.alloc(array_region_size(capacity)?)?)
    }

    fn arr_store_len(&mut self, ptr: Pointer, len: u32) -> Result<(), ModuleError> {
        Ok(self.memory.write_u32(ptr.offset(), len)?)
    }

    fn arr_store_cap(&mut self, ptr: Pointer, capacity: u32) -> Result<(), ModuleError> {
        Ok(self.memory.write_u32(capacity_word(ptr)?, capacity)?)
    }

    fn arr_push_int(&mut self, ptr: Pointer, value: i32) -> Result<(), ModuleError> {
        self.push(ptr, TypeTag::Int32, value as u32)
    }

    fn arr_push_float(&mut self, ptr: Pointer, value: f32) -> Result<(), ModuleError> {
        self.push(ptr, TypeTag::Float32, value.to_bits())
    }

    fn arr_push_string(&mut self, ptr: Pointer, string: Pointer) -> Result<(), ModuleError> {
        self.push(ptr, TypeTag::StringRef, string.offset())
    }

    fn arr_push_array(&mut self, ptr: Pointer, array: Pointer) -> Result<(), ModuleError> {
        self.push(ptr, TypeTag::ArrayRef, array.offset())
    }

    fn arr_get_len(&mut self, ptr: Pointer) -> Result<u32, ModuleError> {
        Ok(self.memory.read_u32(ptr.offset())?)
    }
}
