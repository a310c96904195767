//! Binary layout of strings and arrays inside a module's linear memory.
//!
//! Strings are a 4-byte length header (UTF-8 byte count) followed by the
//! bytes, with no terminator:
//!
//! ```text
//! ptr+0  ptr+4
//! [len ][ b0 b1 ... b(len-1) ]
//! ```
//!
//! Arrays are a length header, a capacity header and `capacity` slots of
//! 8 bytes each. A slot is a [`TypeTag`] word followed by a value word holding
//! an `i32`, the bits of an `f32`, or a [`Pointer`] to a nested region:
//!
//! ```text
//! ptr+0  ptr+4  ptr+8          ptr+16
//! [len ][cap ][tag | value ][tag | value ] ...
//! ```
//!
//! All words are little-endian. Only the first `len` slots are meaningful.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for layout operations
//! - [`buffer`]: Bounds-checked word reads/writes
//! - [`memory`]: Host-side bump-allocated linear memory
//! - [`lower`]: Host value encoding into linear memory
//! - [`lift`]: Linear memory decoding back into host values

mod buffer;
mod error;
mod lift;
mod lower;
mod memory;

pub use buffer::{read_slice, read_u32};
pub use error::AbiError;
pub use lift::{decode_array, decode_string};
pub use lower::{encode_array, encode_string};
pub use memory::LinearMemory;

/// Size of the string length header.
pub const STRING_HEADER_SIZE: u32 = 4;
/// Size of the array length and capacity headers.
pub const ARRAY_HEADER_SIZE: u32 = 8;
/// Offset of the capacity word inside the array header.
pub const ARRAY_CAPACITY_OFFSET: u32 = 4;
/// Size of one array slot (tag word + value word).
pub const SLOT_SIZE: u32 = 8;
/// Offset of the value word inside a slot.
pub const SLOT_VALUE_OFFSET: u32 = 4;
/// Encoded arrays reserve this many slots per element.
pub const ARRAY_OVERALLOCATION: u32 = 2;

/// An offset into a module's linear memory.
///
/// Pointers are only meaningful to the module that produced them. The module
/// calling convention passes them as `i32`; conversion reinterprets the bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer(u32);

impl Pointer {
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    pub const fn offset(self) -> u32 {
        self.0
    }

    /// The pointer as the module's `i32` calling convention sees it.
    pub const fn as_i32(self) -> i32 {
        self.0 as i32
    }

    pub const fn from_i32(raw: i32) -> Self {
        Self(raw as u32)
    }
}

impl From<u32> for Pointer {
    fn from(offset: u32) -> Self {
        Self(offset)
    }
}

impl std::fmt::Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Discriminator stored in the first word of every array slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeTag {
    Int32 = 0,
    Float32 = 1,
    StringRef = 2,
    ArrayRef = 3,
}

impl TypeTag {
    pub fn from_u32(word: u32) -> Option<Self> {
        match word {
            0 => Some(Self::Int32),
            1 => Some(Self::Float32),
            2 => Some(Self::StringRef),
            3 => Some(Self::ArrayRef),
            _ => None,
        }
    }

    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// A raw array slot: the tag word and the undecoded value word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub tag: u32,
    pub value: u32,
}

/// Bytes occupied by a string region holding `byte_len` bytes.
pub fn string_region_size(byte_len: u32) -> Result<u32, AbiError> {
    byte_len
        .checked_add(STRING_HEADER_SIZE)
        .ok_or(AbiError::LengthOverflow(byte_len as usize))
}

/// Bytes occupied by an array region with room for `capacity` slots.
pub fn array_region_size(capacity: u32) -> Result<u32, AbiError> {
    capacity
        .checked_mul(SLOT_SIZE)
        .and_then(|slots| slots.checked_add(ARRAY_HEADER_SIZE))
        .ok_or(AbiError::LengthOverflow(capacity as usize))
}

/// Slots reserved when encoding an array of `len` elements.
pub fn array_capacity_for(len: u32) -> Result<u32, AbiError> {
    len.checked_mul(ARRAY_OVERALLOCATION)
        .ok_or(AbiError::LengthOverflow(len as usize))
}

/// Address of slot `index` of the array at `ptr`.
pub fn slot_offset(ptr: Pointer, index: u32) -> Result<u32, AbiError> {
    index
        .checked_mul(SLOT_SIZE)
        .and_then(|rel| rel.checked_add(ARRAY_HEADER_SIZE))
        .and_then(|rel| ptr.offset().checked_add(rel))
        .ok_or(AbiError::PointerOverflow { base: ptr.offset() })
}

/// The content bytes of the string at `ptr`, given its header length.
pub fn read_string_bytes(memory: &[u8], ptr: Pointer, len: u32) -> Result<&[u8], AbiError> {
    let start = buffer::offset(ptr.offset(), STRING_HEADER_SIZE)?;
    read_slice(memory, start, len)
}

/// Slot `index` of the array at `ptr`.
pub fn read_slot(memory: &[u8], ptr: Pointer, index: u32) -> Result<Slot, AbiError> {
    let at = slot_offset(ptr, index)?;
    Ok(Slot {
        tag: read_u32(memory, at)?,
        value: read_u32(memory, buffer::offset(at, SLOT_VALUE_OFFSET)?)?,
    })
}
