//! Linear memory decoding back into host values.

use super::{AbiError, Pointer, TypeTag, read_slot, read_string_bytes};
use crate::logging::{trace, warn};
use crate::module::{ModuleError, NativeModule};
use crate::value::HostValue;

/// Decode the string region at `ptr`.
pub fn decode_string<M>(module: &mut M, ptr: Pointer) -> Result<String, ModuleError>
where
    M: NativeModule + ?Sized,
{
    let len = module.str_get_len(ptr)?;
    let bytes = read_string_bytes(module.memory(), ptr, len)?;
    let text = std::str::from_utf8(bytes).map_err(|_| AbiError::InvalidUtf8 { ptr: ptr.offset() })?;

    trace!(ptr = ptr.offset(), len, "decoded string");
    Ok(text.to_owned())
}

/// Decode the array region at `ptr`, recursing into nested strings and arrays.
///
/// Slots with an unknown tag are skipped.
pub fn decode_array<M>(module: &mut M, ptr: Pointer) -> Result<Vec<HostValue>, ModuleError>
where
    M: NativeModule + ?Sized,
{
    let len = module.arr_get_len(ptr)?;
    let mut items = Vec::new();

    for index in 0..len {
        let slot = read_slot(module.memory(), ptr, index)?;
        let item = match TypeTag::from_u32(slot.tag) {
            Some(TypeTag::Int32) => HostValue::Int(slot.value as i32),
            Some(TypeTag::Float32) => HostValue::Float(f32::from_bits(slot.value)),
            Some(TypeTag::StringRef) => {
                HostValue::String(decode_string(module, Pointer::new(slot.value))?)
            }
            Some(TypeTag::ArrayRef) => {
                HostValue::Array(decode_array(module, Pointer::new(slot.value))?)
            }
            None => {
                warn!(ptr = ptr.offset(), index, tag = slot.tag, "skipping slot with unknown tag");
                continue;
            }
        };
        items.push(item);
    }

    trace!(ptr = ptr.offset(), len, "decoded array");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{LinearMemory, encode_array, encode_string};
    use crate::module::SimulatedModule;

    #[test]
    fn test_decode_handwritten_regions() {
        let mut mem = LinearMemory::new();
        let s = mem.alloc_string("nested").unwrap();
        let inner = mem.alloc_array(&[(TypeTag::Float32, 1.5f32.to_bits())]).unwrap();
        let outer = mem
            .alloc_array(&[
                (TypeTag::Int32, (-1i32) as u32),
                (TypeTag::StringRef, s.offset()),
                (TypeTag::ArrayRef, inner.offset()),
            ])
            .unwrap();
        let mut module = SimulatedModule::with_memory(mem);

        assert_eq!(
            decode_array(&mut module, outer).unwrap(),
            vec![
                HostValue::Int(-1),
                HostValue::from("nested"),
                HostValue::Array(vec![HostValue::Float(1.5)]),
            ]
        );
    }

    #[test]
    fn test_unknown_tags_are_skipped() {
        let mut mem = LinearMemory::new();
        let ptr = mem.alloc_array(&[(TypeTag::Int32, 1), (TypeTag::Int32, 2)]).unwrap();
        // corrupt the first slot's tag
        mem.write_u32(ptr.offset() + 8, 9).unwrap();
        let mut module = SimulatedModule::with_memory(mem);
        assert_eq!(decode_array(&mut module, ptr).unwrap(), vec![HostValue::Int(2)]);
    }

    #[test]
    fn test_decode_string_out_of_bounds() {
        let mut mem = LinearMemory::new();
        let ptr = mem.alloc(4).unwrap();
        mem.write_u32(ptr.offset(), 100).unwrap();
        let mut module = SimulatedModule::with_memory(mem);
        assert!(matches!(
            decode_string(&mut module, ptr),
            Err(ModuleError::Abi(AbiError::OutOfBounds { len: 100, .. }))
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut mem = LinearMemory::new();
        let ptr = mem.alloc(6).unwrap();
        mem.write_u32(ptr.offset(), 2).unwrap();
        mem.write(ptr.offset() + 4, &[0xff, 0xfe]).unwrap();
        let mut module = SimulatedModule::with_memory(mem);
        assert!(matches!(
            decode_string(&mut module, ptr),
            Err(ModuleError::Abi(AbiError::InvalidUtf8 { .. }))
        ));
    }

    #[test]
    fn test_roundtrip_preserves_number_kinds() {
        let mut module = SimulatedModule::new();
        let values = vec![
            HostValue::Int(7),
            HostValue::Float(7.0),
            HostValue::Array(vec![HostValue::from("x"), HostValue::Array(vec![])]),
        ];
        let ptr = encode_array(&mut module, &values).unwrap();
        assert_eq!(decode_array(&mut module, ptr).unwrap(), values);

        let s = encode_string(&mut module, "héllo wörld").unwrap();
        assert_eq!(decode_string(&mut module, s).unwrap(), "héllo wörld");
    }

    #[test]
    fn test_booleans_decode_as_integers() {
        let mut module = SimulatedModule::new();
        let ptr = encode_array(&mut module, &[true.into(), false.into()]).unwrap();
        assert_eq!(
            decode_array(&mut module, ptr).unwrap(),
            vec![HostValue::Int(1), HostValue::Int(0)]
        );
    }
}
