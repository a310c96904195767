//! Host-side linear memory with a bump allocator.

use super::buffer::{offset, read_slice, read_u32, write_slice, write_u32};
use super::{
    ARRAY_CAPACITY_OFFSET, AbiError, Pointer, SLOT_VALUE_OFFSET, STRING_HEADER_SIZE, TypeTag,
    array_region_size, read_string_bytes, slot_offset, string_region_size,
};

/// Allocations are aligned to the word size of the layout.
const ALIGN: usize = 4;

/// Offset of the first allocation; keeps pointer `0` unused.
const DEFAULT_BASE: u32 = 8;

#[inline]
fn align_to(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// A flat, byte-addressable memory region owned by a host-side module.
///
/// Regions are handed out by a bump allocator and never freed, matching the
/// allocation discipline of the native modules the bridge talks to.
///
/// # Example
///
/// ```
/// use native_bridge::abi::LinearMemory;
///
/// let mut mem = LinearMemory::new();
/// let ptr = mem.alloc(8).unwrap();
/// mem.write_u32(ptr.offset(), 42).unwrap();
/// assert_eq!(mem.read_u32(ptr.offset()).unwrap(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearMemory {
    data: Vec<u8>,
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearMemory {
    /// Create a memory whose first allocation starts past a small reserved prefix.
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BASE)
    }

    /// Create a memory whose first allocation starts at `base` (rounded up to alignment).
    pub fn with_base(base: u32) -> Self {
        Self {
            data: vec![0; align_to(base as usize, ALIGN)],
        }
    }

    /// Create a linear memory from existing bytes; allocation continues after them.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Allocate `size` zeroed bytes and return the pointer to the region start.
    pub fn alloc(&mut self, size: u32) -> Result<Pointer, AbiError> {
        let start = align_to(self.data.len(), ALIGN);
        let end = start
            .checked_add(size as usize)
            .filter(|end| *end <= u32::MAX as usize)
            .ok_or(AbiError::LengthOverflow(size as usize))?;
        let ptr = u32::try_from(start).map_err(|_| AbiError::LengthOverflow(start))?;
        self.data.resize(end, 0);
        Ok(Pointer::new(ptr))
    }

    /// Write bytes at a specific offset inside already allocated memory.
    pub fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), AbiError> {
        write_slice(&mut self.data, offset, bytes)
    }

    /// Read bytes from a specific offset in memory.
    pub fn read(&self, offset: u32, len: u32) -> Result<&[u8], AbiError> {
        read_slice(&self.data, offset, len)
    }

    pub fn write_u32(&mut self, offset: u32, value: u32) -> Result<(), AbiError> {
        write_u32(&mut self.data, offset, value)
    }

    pub fn read_u32(&self, offset: u32) -> Result<u32, AbiError> {
        read_u32(&self.data, offset)
    }

    /// Allocate and fill a string region in one step.
    pub fn alloc_string(&mut self, text: &str) -> Result<Pointer, AbiError> {
        let len = u32::try_from(text.len()).map_err(|_| AbiError::LengthOverflow(text.len()))?;
        let ptr = self.alloc(string_region_size(len)?)?;
        self.write_u32(ptr.offset(), len)?;
        self.write(offset(ptr.offset(), STRING_HEADER_SIZE)?, text.as_bytes())?;
        Ok(ptr)
    }

    /// Read the string region at `ptr`.
    pub fn read_string(&self, ptr: Pointer) -> Result<String, AbiError> {
        let len = self.read_u32(ptr.offset())?;
        let bytes = read_string_bytes(&self.data, ptr, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8 { ptr: ptr.offset() })
    }

    /// Allocate a full array region (length == capacity) holding `slots`.
    pub fn alloc_array(&mut self, slots: &[(TypeTag, u32)]) -> Result<Pointer, AbiError> {
        let len = u32::try_from(slots.len()).map_err(|_| AbiError::LengthOverflow(slots.len()))?;
        let ptr = self.alloc(array_region_size(len)?)?;
        self.write_u32(ptr.offset(), len)?;
        self.write_u32(offset(ptr.offset(), ARRAY_CAPACITY_OFFSET)?, len)?;
        for (index, (tag, value)) in (0u32..).zip(slots) {
            let at = slot_offset(ptr, index)?;
            self.write_u32(at, tag.as_u32())?;
            self.write_u32(offset(at, SLOT_VALUE_OFFSET)?, *value)?;
        }
        Ok(ptr)
    }

    /// Get the raw bytes of the linear memory.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the linear memory and return the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Check if the memory holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the length of the memory in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl From<Vec<u8>> for LinearMemory {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<LinearMemory> for Vec<u8> {
    fn from(memory: LinearMemory) -> Self {
        memory.data
    }
}

impl AsRef<[u8]> for LinearMemory {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_are_aligned_and_disjoint() {
        let mut mem = LinearMemory::new();
        let a = mem.alloc(5).unwrap();
        let b = mem.alloc(4).unwrap();
        assert_eq!(a.offset(), 8);
        assert_eq!(b.offset(), 16);
        assert_eq!(mem.len(), 20);
    }

    #[test]
    fn test_pointer_zero_is_never_handed_out() {
        let mut mem = LinearMemory::with_base(0);
        assert_eq!(mem.alloc(4).unwrap().offset(), 0);

        let mut mem = LinearMemory::new();
        assert_ne!(mem.alloc(4).unwrap().offset(), 0);
    }

    #[test]
    fn test_write_outside_allocation_fails() {
        let mut mem = LinearMemory::new();
        let ptr = mem.alloc(4).unwrap();
        assert!(mem.write(ptr.offset(), &[1, 2, 3, 4]).is_ok());
        assert!(matches!(
            mem.write(ptr.offset() + 2, &[1, 2, 3, 4]),
            Err(AbiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_string_and_array_helpers() {
        let mut mem = LinearMemory::new();
        let s = mem.alloc_string("héllo").unwrap();
        assert_eq!(mem.read_u32(s.offset()).unwrap(), 6);
        assert_eq!(mem.read_string(s).unwrap(), "héllo");

        let a = mem
            .alloc_array(&[(TypeTag::Int32, 7), (TypeTag::StringRef, s.offset())])
            .unwrap();
        assert_eq!(mem.read_u32(a.offset()).unwrap(), 2);
        assert_eq!(mem.read_u32(a.offset() + 4).unwrap(), 2);
        assert_eq!(mem.read_u32(a.offset() + 8).unwrap(), 0);
        assert_eq!(mem.read_u32(a.offset() + 12).unwrap(), 7);
        assert_eq!(mem.read_u32(a.offset() + 16).unwrap(), 2);
        assert_eq!(mem.read_u32(a.offset() + 20).unwrap(), s.offset());
    }

    #[test]
    fn test_from_bytes_continues_after_existing_data() {
        let mut mem = LinearMemory::from_bytes(vec![7; 10]);
        assert_eq!(mem.alloc(1).unwrap().offset(), 12);
        assert_eq!(mem.read(0, 2).unwrap(), &[7, 7]);
        let bytes: Vec<u8> = mem.into();
        assert_eq!(bytes.len(), 13);
    }
}
