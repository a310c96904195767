//! Core WebAssembly module runner using wasmtime.
//!
//! Wraps an instantiated module that exports the string/array primitives, a
//! `memory`, and any number of entry points taking and returning `i32`/`f32`.

use std::collections::HashMap;
use std::path::Path;

use wasmtime::{Config, Engine, ExternType, Func, Linker, Memory, Module, Store, Val, ValType};

use super::error::WasmError;
use crate::abi::Pointer;
use crate::logging::{debug, info};
use crate::module::{ModuleError, NativeModule, RawValue, names};

/// A core WebAssembly module driven through the native primitives.
pub struct WasmModule {
    store: Store<()>,
    memory: Memory,
    funcs: HashMap<String, Func>,
}

impl WasmModule {
    /// Compile and instantiate a module from binary or text (WAT) bytes.
    ///
    /// The module must not import anything, and must export `memory` plus
    /// every primitive in [`names::PRIMITIVES`].
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, WasmError> {
        let config = Config::new();
        let engine = Engine::new(&config)?;
        let module = Module::new(&engine, bytes)?;

        let linker: Linker<()> = Linker::new(&engine);
        let mut store = Store::new(&engine, ());
        let instance = linker.instantiate(&mut store, &module)?;

        let memory = instance
            .get_memory(&mut store, names::MEMORY)
            .ok_or_else(|| WasmError::MissingExport(names::MEMORY.to_string()))?;

        let mut funcs = HashMap::new();
        for export in module.exports() {
            if !matches!(export.ty(), ExternType::Func(_)) {
                continue;
            }
            if let Some(func) = instance.get_func(&mut store, export.name()) {
                funcs.insert(export.name().to_string(), func);
            }
        }

        if let Some(missing) = names::PRIMITIVES.iter().find(|p| !funcs.contains_key(**p)) {
            return Err(WasmError::MissingExport((*missing).to_string()));
        }

        info!(
            functions = funcs.len(),
            memory_bytes = memory.data_size(&store),
            "instantiated native module"
        );

        Ok(Self {
            store,
            memory,
            funcs,
        })
    }

    /// Load a module from a `.wasm` or `.wat` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WasmError> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), len = bytes.len(), "read module file");
        Self::new(bytes)
    }

    /// Names of all exported functions, primitives included, sorted.
    pub fn entry_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Current size of the linear memory in bytes.
    pub fn memory_size(&self) -> usize {
        self.memory.data_size(&self.store)
    }

    fn func(&self, name: &str) -> Result<Func, ModuleError> {
        self.funcs
            .get(name)
            .copied()
            .ok_or_else(|| ModuleError::EntryNotFound(name.to_string()))
    }

    /// Call `name` with raw arguments coerced to its declared parameter types.
    fn call(&mut self, name: &str, args: &[RawValue]) -> Result<Option<RawValue>, ModuleError> {
        let func = self.func(name)?;
        let ty = func.ty(&self.store);

        if ty.params().len() != args.len() {
            return Err(WasmError::InvalidSignature {
                name: name.to_string(),
                expected: ty.params().len(),
                actual: args.len(),
            }
            .into());
        }

        let params = ty
            .params()
            .zip(args)
            .map(|(param, arg)| to_val(name, &param, *arg))
            .collect::<Result<Vec<_>, _>>()?;
        let mut results = ty
            .results()
            .map(|result| placeholder(name, &result))
            .collect::<Result<Vec<_>, _>>()?;

        func.call(&mut self.store, &params, &mut results)
            .map_err(|e| ModuleError::Trap {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        results
            .first()
            .map(|val| from_val(name, val))
            .transpose()
            .map_err(ModuleError::from)
    }

    fn call_i32(&mut self, name: &str, args: &[RawValue]) -> Result<i32, ModuleError> {
        match self.call(name, args)? {
            Some(RawValue::I32(v)) => Ok(v),
            _ => Err(ModuleError::UnexpectedResult {
                name: name.to_string(),
                expected: "i32".to_string(),
            }),
        }
    }

    fn call_ptr(&mut self, name: &str, args: &[RawValue]) -> Result<Pointer, ModuleError> {
        self.call_i32(name, args).map(Pointer::from_i32)
    }

    fn call_len(&mut self, name: &str, ptr: Pointer) -> Result<u32, ModuleError> {
        self.call_i32(name, &[ptr_arg(ptr)]).map(|len| len as u32)
    }

    /// Call a primitive that stores or appends; any result is ignored.
    fn call_void(&mut self, name: &str, args: &[RawValue]) -> Result<(), ModuleError> {
        self.call(name, args).map(|_| ())
    }
}

impl std::fmt::Debug for WasmModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmModule")
            .field("functions", &self.entry_names())
            .field("memory_size", &self.memory_size())
            .finish()
    }
}

fn ptr_arg(ptr: Pointer) -> RawValue {
    RawValue::I32(ptr.as_i32())
}

fn u32_arg(v: u32) -> RawValue {
    RawValue::I32(v as i32)
}

fn unsupported(name: &str, ty: &ValType) -> WasmError {
    WasmError::UnsupportedValType {
        name: name.to_string(),
        ty: format!("{ty:?}"),
    }
}

fn to_val(name: &str, ty: &ValType, arg: RawValue) -> Result<Val, WasmError> {
    match ty {
        ValType::I32 => Ok(Val::I32(arg.as_i32())),
        ValType::F32 => Ok(Val::F32(arg.as_f32().to_bits())),
        other => Err(unsupported(name, other)),
    }
}

fn placeholder(name: &str, ty: &ValType) -> Result<Val, WasmError> {
    match ty {
        ValType::I32 => Ok(Val::I32(0)),
        ValType::F32 => Ok(Val::F32(0)),
        other => Err(unsupported(name, other)),
    }
}

fn from_val(name: &str, val: &Val) -> Result<RawValue, WasmError> {
    match val {
        Val::I32(v) => Ok(RawValue::I32(*v)),
        Val::F32(bits) => Ok(RawValue::F32(f32::from_bits(*bits))),
        other => Err(WasmError::UnsupportedValType {
            name: name.to_string(),
            ty: format!("{other:?}"),
        }),
    }
}

impl NativeModule for WasmModule {
    fn has_entry(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    fn call_entry(
        &mut self,
        name: &str,
        args: &[RawValue],
    ) -> Result<Option<RawValue>, ModuleError> {
        debug!(entry = name, args = args.len(), "calling entry");
        self.call(name, args)
    }

    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn str_alloc(&mut self, byte_len: u32) -> Result<Pointer, ModuleError> {
        self.call_ptr(names::STR_ALLOC, &[u32_arg(byte_len)])
    }

    fn str_store_len(&mut self, ptr: Pointer, len: u32) -> Result<(), ModuleError> {
        self.call_void(names::STR_STORE_LEN, &[ptr_arg(ptr), u32_arg(len)])
    }

    fn str_store_byte(&mut self, ptr: Pointer, offset: u32, byte: u8) -> Result<(), ModuleError> {
        self.call_void(
            names::STR_STORE_BYTE,
            &[ptr_arg(ptr), u32_arg(offset), RawValue::I32(i32::from(byte))],
        )
    }

    fn str_get_len(&mut self, ptr: Pointer) -> Result<u32, ModuleError> {
        self.call_len(names::STR_GET_LEN, ptr)
    }

    fn arr_alloc(&mut self, capacity: u32) -> Result<Pointer, ModuleError> {
        self.call_ptr(names::ARR_ALLOC, &[u32_arg(capacity)])
    }

    fn arr_store_len(&mut self, ptr: Pointer, len: u32) -> Result<(), ModuleError> {
        self.call_void(names::ARR_STORE_LEN, &[ptr_arg(ptr), u32_arg(len)])
    }

    fn arr_store_cap(&mut self, ptr: Pointer, capacity: u32) -> Result<(), ModuleError> {
        self.call_void(names::ARR_STORE_CAP, &[ptr_arg(ptr), u32_arg(capacity)])
    }

    fn arr_push_int(&mut self, ptr: Pointer, value: i32) -> Result<(), ModuleError> {
        self.call_void(names::ARR_PUSH_INT, &[ptr_arg(ptr), RawValue::I32(value)])
    }

    fn arr_push_float(&mut self, ptr: Pointer, value: f32) -> Result<(), ModuleError> {
        self.call_void(names::ARR_PUSH_FLOAT, &[ptr_arg(ptr), RawValue::F32(value)])
    }

    fn arr_push_string(&mut self, ptr: Pointer, string: Pointer) -> Result<(), ModuleError> {
        self.call_void(names::ARR_PUSH_STRING, &[ptr_arg(ptr), ptr_arg(string)])
    }

    fn arr_push_array(&mut self, ptr: Pointer, array: Pointer) -> Result<(), ModuleError> {
        self.call_void(names::ARR_PUSH_ARRAY, &[ptr_arg(ptr), ptr_arg(array)])
    }

    fn arr_get_len(&mut self, ptr: Pointer) -> Result<u32, ModuleError> {
        self.call_len(names::ARR_GET_LEN, ptr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_PRIMITIVES: &str = r#"
        (module
          (memory (export "memory") 1)
          (func (export "add") (param i32 i32) (result i32)
            local.get 0
            local.get 1
            i32.add))
    "#;

    #[test]
    fn test_missing_primitive_is_rejected() {
        let err = WasmModule::new(MISSING_PRIMITIVES).unwrap_err();
        assert!(
            matches!(err, WasmError::MissingExport(ref name) if name == names::STR_ALLOC),
            "{err}"
        );
    }

    #[test]
    fn test_missing_memory_is_rejected() {
        let err = WasmModule::new("(module)").unwrap_err();
        assert!(matches!(err, WasmError::MissingExport(ref name) if name == "memory"));
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(matches!(
            WasmModule::new(b"\0asm garbage"),
            Err(WasmError::Wasmtime(_))
        ));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(
            to_val("f", &ValType::F32, RawValue::I32(2)).unwrap().unwrap_f32(),
            2.0
        );
        assert_eq!(
            to_val("f", &ValType::I32, RawValue::F32(-3.0)).unwrap().unwrap_i32(),
            -3
        );
        assert!(matches!(
            to_val("f", &ValType::I64, RawValue::I32(1)),
            Err(WasmError::UnsupportedValType { .. })
        ));
        assert_eq!(
            from_val("f", &Val::F32(1.5f32.to_bits())).unwrap(),
            RawValue::F32(1.5)
        );
        assert!(from_val("f", &Val::I64(1)).is_err());
    }
}
