//! Bounds-checked little-endian helpers over a linear-memory byte view.

use super::AbiError;

/// Resolve `ptr..ptr + len` against a buffer, or report the access as out of bounds.
#[inline]
fn range(buffer: &[u8], ptr: u32, len: u32) -> Result<std::ops::Range<usize>, AbiError> {
    let start = ptr as usize;
    let end = start
        .checked_add(len as usize)
        .ok_or(AbiError::PointerOverflow { base: ptr })?;
    if end > buffer.len() {
        return Err(AbiError::OutOfBounds {
            ptr,
            len,
            memory_size: buffer.len(),
        });
    }
    Ok(start..end)
}

/// Safe slice read - returns an error instead of panicking.
#[inline]
pub fn read_slice(buffer: &[u8], ptr: u32, len: u32) -> Result<&[u8], AbiError> {
    let r = range(buffer, ptr, len)?;
    buffer.get(r).ok_or(AbiError::OutOfBounds {
        ptr,
        len,
        memory_size: buffer.len(),
    })
}

/// Safe slice write - returns an error instead of panicking.
#[inline]
pub fn write_slice(buffer: &mut [u8], ptr: u32, data: &[u8]) -> Result<(), AbiError> {
    let len = u32::try_from(data.len()).map_err(|_| AbiError::LengthOverflow(data.len()))?;
    let r = range(buffer, ptr, len)?;
    let memory_size = buffer.len();
    buffer
        .get_mut(r)
        .ok_or(AbiError::OutOfBounds {
            ptr,
            len,
            memory_size,
        })?
        .copy_from_slice(data);
    Ok(())
}

#[inline]
fn read_word(buffer: &[u8], ptr: u32) -> Result<[u8; 4], AbiError> {
    let bytes = read_slice(buffer, ptr, 4)?;
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    Ok(word)
}

/// Read a little-endian `u32` word.
#[inline]
pub fn read_u32(buffer: &[u8], ptr: u32) -> Result<u32, AbiError> {
    read_word(buffer, ptr).map(u32::from_le_bytes)
}

/// Write a little-endian `u32` word.
#[inline]
pub fn write_u32(buffer: &mut [u8], ptr: u32, value: u32) -> Result<(), AbiError> {
    write_slice(buffer, ptr, &value.to_le_bytes())
}

/// Add a byte offset to a pointer, failing on 32-bit overflow.
#[inline]
pub fn offset(base: u32, by: u32) -> Result<u32, AbiError> {
    base.checked_add(by)
        .ok_or(AbiError::PointerOverflow { base })
}
