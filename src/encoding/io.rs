//! Bounds-checked little-endian reading and writing of fixed-width integers.
//!
//! Custom debug information framing is defined entirely in terms of little-endian fixed-width
//! fields: the global header, every record header, and the payloads of the legacy record kinds
//! (using groups, forward tokens, dynamic locals, tuple element names). This module provides the
//! primitive operations all of those are built on.
//!
//! # Key Components
//!
//! - [`crate::encoding::io::WireIO`] - Trait describing a fixed-width integer's byte form
//! - [`crate::encoding::io::read_le`] / [`crate::encoding::io::read_le_at`] - Checked reads
//! - [`crate::encoding::io::write_le_at`] - Checked in-place writes, used to backpatch sizes
//! - [`crate::encoding::io::push_le`] - Appends to a growable buffer
//!
//! # Examples
//!
//! ```rust
//! use cdiscope::encoding::io::{push_le, read_le_at, write_le_at};
//!
//! let mut buffer = Vec::new();
//! push_le(&mut buffer, 0x0102_u16);
//! push_le(&mut buffer, 0_u32);
//!
//! // Patch the reserved u32 once its value is known
//! let mut patch = 2;
//! write_le_at(&mut buffer, &mut patch, 0x0a_u32)?;
//!
//! let mut offset = 0;
//! assert_eq!(read_le_at::<u16>(&buffer, &mut offset)?, 0x0102);
//! assert_eq!(read_le_at::<u32>(&buffer, &mut offset)?, 0x0a);
//! # Ok::<(), cdiscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Every read and in-place write returns [`crate::Error::OutOfBounds`] if the buffer does not
//! hold enough bytes at the requested offset. Offsets are only advanced on success.

use crate::Result;

/// Fixed-width integer types that can be moved to and from little-endian bytes.
///
/// Each implementation names the byte array matching its width, so reads and writes
/// never need to reinterpret memory.
pub trait WireIO: Sized + Copy {
    /// Byte array matching the width of the type.
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Build the value from little-endian bytes
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Convert the value into little-endian bytes
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_wire_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WireIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_wire_io!(u8, i8, u16, i16, u32, i32);

/// Reads a value of type `T` in little-endian byte order from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: WireIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a value of type `T` in little-endian byte order at `offset`, advancing it.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Position to read at; advanced past the value on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: WireIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = T::Bytes::try_from(&data[*offset..end]) else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Writes `value` in little-endian byte order at `offset`, advancing it.
///
/// Used to fill in fields that were reserved before their value was known, such as the
/// record size of a custom debug information record.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit at `offset`.
pub fn write_le_at<T: WireIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();

    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;
    Ok(())
}

/// Appends `value` in little-endian byte order to a growable buffer.
pub fn push_le<T: WireIO>(buffer: &mut Vec<u8>, value: T) {
    buffer.extend_from_slice(value.to_le_bytes().as_ref());
}
