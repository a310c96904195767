//! Host value encoding into a module's linear memory.
//!
//! Every region is allocated and written through the module's own
//! primitives; the bridge never owns or frees memory.

use super::{AbiError, Pointer, STRING_HEADER_SIZE, array_capacity_for};
use crate::logging::trace;
use crate::module::{ModuleError, NativeModule};
use crate::value::HostValue;

fn header_len(len: usize) -> Result<u32, AbiError> {
    u32::try_from(len).map_err(|_| AbiError::LengthOverflow(len))
}

/// Encode `text` as a length-prefixed UTF-8 string region.
pub fn encode_string<M>(module: &mut M, text: &str) -> Result<Pointer, ModuleError>
where
    M: NativeModule + ?Sized,
{
    let bytes = text.as_bytes();
    let len = header_len(bytes.len())?;

    let ptr = module.str_alloc(len)?;
    module.str_store_len(ptr, len)?;
    for (i, byte) in (0u32..).zip(bytes) {
        let offset = i
            .checked_add(STRING_HEADER_SIZE)
            .ok_or(AbiError::PointerOverflow { base: ptr.offset() })?;
        module.str_store_byte(ptr, offset, *byte)?;
    }

    trace!(ptr = ptr.offset(), len, "encoded string");
    Ok(ptr)
}

/// Encode `values` as an array region with twice as many slots as elements.
///
/// `Null` elements are skipped, so the resulting length header counts the
/// appended slots only. Booleans go through the integer slot path. Nested
/// arrays recurse; inputs must be acyclic.
pub fn encode_array<M>(module: &mut M, values: &[HostValue]) -> Result<Pointer, ModuleError>
where
    M: NativeModule + ?Sized,
{
    let len = header_len(values.len())?;
    let capacity = array_capacity_for(len)?;

    let ptr = module.arr_alloc(capacity)?;
    // the push primitives append at the current length
    module.arr_store_len(ptr, 0)?;
    module.arr_store_cap(ptr, capacity)?;

    for value in values {
        push_element(module, ptr, value)?;
    }

    trace!(ptr = ptr.offset(), len, capacity, "encoded array");
    Ok(ptr)
}

fn push_element<M>(module: &mut M, ptr: Pointer, value: &HostValue) -> Result<(), ModuleError>
where
    M: NativeModule + ?Sized,
{
    match value {
        HostValue::Int(v) => module.arr_push_int(ptr, *v),
        HostValue::Float(v) => module.arr_push_float(ptr, *v),
        HostValue::Bool(b) => module.arr_push_int(ptr, i32::from(*b)),
        HostValue::String(s) => {
            let string = encode_string(module, s)?;
            module.arr_push_string(ptr, string)
        }
        HostValue::Array(items) => {
            let array = encode_array(module, items)?;
            module.arr_push_array(ptr, array)
        }
        HostValue::Null => Ok(()),
    }
}
