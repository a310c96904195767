//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use native_bridge::HostValue;
use native_bridge::module::SimulatedModule;

/// Text of the WebAssembly test module.
pub const NATIVE_WAT: &str = include_str!("../fixtures/native.wat");

/// Entry points of the WebAssembly test module, primitives excluded.
pub const NATIVE_ENTRIES: &[&str] = &[
    "add", "echo", "fail", "greet", "half", "negate", "noop", "range", "strlen", "sum", "wide",
];

/// A simulated module whose `echo` entry returns its first argument.
pub fn echo_module() -> SimulatedModule {
    SimulatedModule::new().with_entry("echo", |_memory, args| Ok(args.first().copied()))
}

/// Build a nested array value from integers, for readable expectations.
pub fn ints(values: &[i32]) -> HostValue {
    HostValue::Array(values.iter().copied().map(HostValue::Int).collect())
}

#[cfg(feature = "wasm")]
pub fn native_module() -> native_bridge::WasmModule {
    native_bridge::WasmModule::new(NATIVE_WAT).unwrap()
}

#[cfg(feature = "wasm")]
pub fn wasm_bridge() -> native_bridge::Bridge<native_bridge::WasmModule> {
    native_bridge::Bridge::new(native_module())
}
