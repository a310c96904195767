//! End-to-end calls against a real WebAssembly module.

mod common;

use common::{NATIVE_ENTRIES, NATIVE_WAT, ints, native_module, wasm_bridge};
use native_bridge::abi::{read_slot, read_u32};
use native_bridge::module::names;
use native_bridge::{
    CallError, HostValue, ModuleError, NativeModule, Pointer, TypeTag, ValueType, WasmError,
    WasmModule,
};

#[test]
fn test_exports_are_listed() {
    let module = native_module();
    let names_listed: Vec<&str> = module
        .entry_names()
        .into_iter()
        .filter(|name| !names::PRIMITIVES.contains(name))
        .collect();
    assert_eq!(names_listed, NATIVE_ENTRIES);
    for primitive in names::PRIMITIVES {
        assert!(module.has_entry(primitive), "{primitive}");
    }
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("native.wat");
    std::fs::write(&path, NATIVE_WAT).unwrap();
    assert!(WasmModule::from_file(&path).unwrap().has_entry("greet"));

    assert!(matches!(
        WasmModule::from_file(dir.path().join("missing.wasm")),
        Err(WasmError::ModuleLoad(_))
    ));
}

#[test]
fn test_primitive_calls() {
    let mut bridge = wasm_bridge();
    let add = bridge
        .invoke("add", &["int", "int"], &["int"], vec![HostValue::Int(2), HostValue::Int(3)])
        .unwrap();
    assert_eq!(add, HostValue::Int(5));

    let half = bridge
        .invoke("half", &["float"], &["float"], vec![HostValue::Float(3.0)])
        .unwrap();
    assert_eq!(half, HostValue::Float(1.5));

    // an int argument declared float is converted to the f32 parameter
    let half = bridge
        .invoke("half", &["float"], &["float"], vec![HostValue::Int(5)])
        .unwrap();
    assert_eq!(half, HostValue::Float(2.5));
}

#[test]
fn test_bool_arguments_and_returns() {
    let mut bridge = wasm_bridge();
    let cases = [
        (HostValue::Bool(true), false),
        (HostValue::Bool(false), true),
        (HostValue::Int(7), false),
        (HostValue::Int(-7), true),
        (HostValue::Float(0.0), true),
    ];
    for (arg, expected) in cases {
        let result = bridge
            .invoke("negate", &["bool"], &["bool"], vec![arg.clone()])
            .unwrap();
        assert_eq!(result, HostValue::Bool(expected), "negate({arg})");
    }
}

#[test]
fn test_string_in_string_out() {
    let mut bridge = wasm_bridge();
    for (name, expected) in [("hi", "hello, hi"), ("", "hello, "), ("wörld", "hello, wörld")] {
        let result = bridge
            .invoke("greet", &["string"], &["string"], vec![name.into()])
            .unwrap();
        assert_eq!(result, HostValue::from(expected));
    }
}

#[test]
fn test_string_length_is_byte_count() {
    let mut bridge = wasm_bridge();
    let len = bridge
        .invoke("strlen", &["string"], &["int"], vec!["日本".into()])
        .unwrap();
    assert_eq!(len, HostValue::Int(6));
}

#[test]
fn test_array_arguments() {
    let mut bridge = wasm_bridge();
    let sum = bridge
        .invoke("sum", &["array"], &["int"], vec![ints(&[1, 2, 3])])
        .unwrap();
    assert_eq!(sum, HostValue::Int(6));

    let mixed = HostValue::Array(vec![
        HostValue::from("a"),
        HostValue::Int(4),
        HostValue::Float(1.5),
        ints(&[100]),
        HostValue::Bool(true),
    ]);
    let sum = bridge
        .invoke("sum", &["array"], &["int"], vec![mixed])
        .unwrap();
    assert_eq!(sum, HostValue::Int(5));
}

#[test]
fn test_array_returned_by_module() {
    let mut bridge = wasm_bridge();
    assert_eq!(
        bridge
            .invoke("range", &["int"], &["array"], vec![HostValue::Int(4)])
            .unwrap(),
        ints(&[0, 1, 2, 3])
    );
    assert_eq!(
        bridge
            .invoke("range", &["int"], &["array"], vec![HostValue::Int(0)])
            .unwrap(),
        HostValue::Array(vec![])
    );
}

#[test]
fn test_nested_array_roundtrip() {
    let mut bridge = wasm_bridge();
    let value = HostValue::Array(vec![
        HostValue::Int(-1),
        HostValue::Float(0.25),
        HostValue::from("x"),
        HostValue::Array(vec![HostValue::from("deep"), ints(&[])]),
    ]);
    let result = bridge
        .invoke("echo", &["array"], &["array"], vec![value.clone()])
        .unwrap();
    assert_eq!(result, value);
}

#[test]
fn test_encoded_array_layout() {
    let mut bridge = wasm_bridge();
    // an undeclared pointer return passes through as an integer
    let ptr = bridge
        .invoke("echo", &["array"], &["int"], vec![ints(&[10, 20, 30])])
        .unwrap();
    let HostValue::Int(ptr) = ptr else {
        panic!("expected pointer, got {ptr}");
    };
    let ptr = Pointer::from_i32(ptr);
    let memory = bridge.module().unwrap().memory();

    assert_eq!(read_u32(memory, ptr.offset()).unwrap(), 3);
    assert_eq!(read_u32(memory, ptr.offset() + 4).unwrap(), 6);
    let slot = read_slot(memory, ptr, 2).unwrap();
    assert_eq!(TypeTag::from_u32(slot.tag), Some(TypeTag::Int32));
    assert_eq!(slot.value, 30);
}

#[test]
fn test_large_array_grows_memory() {
    let mut bridge = wasm_bridge();
    let before = bridge.module().unwrap().memory_size();
    let values: Vec<i32> = (0..10_000).collect();
    let sum = bridge
        .invoke("sum", &["array"], &["int"], vec![ints(&values)])
        .unwrap();
    assert_eq!(sum, HostValue::Int(values.iter().sum()));
    assert!(bridge.module().unwrap().memory_size() > before);
}

#[test]
fn test_void_entry() {
    let mut bridge = wasm_bridge();
    assert_eq!(bridge.invoke("noop", &[], &[], vec![]).unwrap(), HostValue::Null);

    let err = bridge.invoke("noop", &[], &["string"], vec![]).unwrap_err();
    assert!(matches!(
        err,
        CallError::MissingReturn {
            expected: ValueType::String,
            ..
        }
    ));
}

#[test]
fn test_unknown_return_token_passes_through() {
    let mut bridge = wasm_bridge();
    let args = || vec![HostValue::Int(3), HostValue::Int(4)];
    for returns in [&["void"][..], &["int", "tuple"][..]] {
        let out = bridge.invoke("add", &["int", "int"], returns, args()).unwrap();
        assert_eq!(out, HostValue::Int(7), "{returns:?}");
    }
    assert_eq!(bridge.invoke("noop", &[], &["void"], vec![]).unwrap(), HostValue::Null);
}

#[test]
fn test_rejected_calls() {
    let mut bridge = wasm_bridge();

    let err = bridge.invoke("missing", &[], &[], vec![]).unwrap_err();
    assert!(matches!(err, CallError::UnknownEntry(ref name) if name == "missing"));
    assert_eq!(err.to_string(), "Function missing not found in native module");

    let err = bridge
        .invoke("add", &["int", "int"], &["int"], vec![HostValue::Int(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        CallError::ArityMismatch {
            expected: 2,
            got: 1
        }
    ));

    let err = bridge
        .invoke("greet", &["string"], &["string"], vec![HostValue::Int(1)])
        .unwrap_err();
    assert_eq!(err.type_mismatch(), Some((0, ValueType::String)));

    let err = bridge
        .invoke("add", &["int", "long"], &["int"], vec![HostValue::Int(1), HostValue::Int(2)])
        .unwrap_err();
    assert!(matches!(err, CallError::UnknownType(_)));
}

#[test]
fn test_trap_is_reported() {
    let mut bridge = wasm_bridge();
    let err = bridge.invoke("fail", &[], &["int"], vec![]).unwrap_err();
    assert!(
        matches!(err, CallError::Module(ModuleError::Trap { ref name, .. }) if name == "fail"),
        "{err}"
    );

    // the instance stays usable after a trap
    assert_eq!(
        bridge
            .invoke("add", &["int", "int"], &["int"], vec![HostValue::Int(1), HostValue::Int(1)])
            .unwrap(),
        HostValue::Int(2)
    );
}

#[test]
fn test_unsupported_value_type() {
    let mut bridge = wasm_bridge();
    let err = bridge
        .invoke("wide", &["int"], &["int"], vec![HostValue::Int(1)])
        .unwrap_err();
    assert!(
        matches!(
            err,
            CallError::Module(ModuleError::Wasm(WasmError::UnsupportedValType { ref name, .. }))
                if name == "wide"
        ),
        "{err}"
    );
}

#[test]
fn test_declared_arity_must_match_export() {
    let mut bridge = wasm_bridge();
    let err = bridge
        .invoke("add", &["int"], &["int"], vec![HostValue::Int(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        CallError::Module(ModuleError::Wasm(WasmError::InvalidSignature {
            expected: 2,
            actual: 1,
            ..
        }))
    ));
}

#[cfg(feature = "config")]
#[test]
fn test_manifest_signatures() {
    let manifest = native_bridge::Manifest::from_str(
        r#"
[[entries]]
name = "greet"
params = ["string"]
returns = ["string"]

[[entries]]
name = "range"
params = ["int"]
returns = ["array"]
"#,
    )
    .unwrap();

    let mut bridge = wasm_bridge();
    let greet = manifest.signature("greet").unwrap();
    assert_eq!(
        bridge
            .invoke_signature("greet", &greet, vec!["manifest".into()])
            .unwrap(),
        HostValue::from("hello, manifest")
    );
    let range = manifest.signature("range").unwrap();
    assert_eq!(
        bridge
            .invoke_signature("range", &range, vec![HostValue::Int(2)])
            .unwrap(),
        ints(&[0, 1])
    );
}
