//! Compressed integer encoding as defined in ECMA-335 II.23.2.
//!
//! All Edit-and-Continue maps store their integers in this compressed form. The encoding is
//! big-endian and the high bits of the first byte select the total length:
//!
//! | Range                       | Length | First byte   |
//! |-----------------------------|--------|--------------|
//! | `0x00..=0x7F`               | 1      | `0xxxxxxx`   |
//! | `0x80..=0x3FFF`             | 2      | `10xxxxxx`   |
//! | `0x4000..=0x1FFF_FFFF`      | 4      | `110xxxxx`   |
//!
//! A first byte of the form `111xxxxx` is never produced and is rejected on read.
//!
//! Signed values fold their sign into the lowest bit before compression: a non-negative `v`
//! becomes `v << 1`, a negative `v` becomes `(!v << 1) | 1`. Small magnitudes of either sign
//! therefore stay in the one-byte form.
//!
//! # Examples
//!
//! ```rust
//! use cdiscope::encoding::compressed::{write_compressed_int, write_compressed_uint};
//! use cdiscope::Parser;
//!
//! let mut buffer = Vec::new();
//! write_compressed_uint(200, &mut buffer)?;
//! write_compressed_int(-3, &mut buffer)?;
//! assert_eq!(buffer, [0x80, 0xC8, 0x05]);
//!
//! let mut parser = Parser::new(&buffer);
//! assert_eq!(parser.read_compressed_uint()?, 200);
//! assert_eq!(parser.read_compressed_int()?, -3);
//! # Ok::<(), cdiscope::Error>(())
//! ```

use crate::{Error, Result};

/// Largest value representable as a compressed unsigned integer.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Smallest value representable as a compressed signed integer.
pub const MIN_COMPRESSED_INT: i32 = -0x1000_0000;

/// Largest value representable as a compressed signed integer.
pub const MAX_COMPRESSED_INT: i32 = 0x0FFF_FFFF;

/// Returns the number of bytes `value` occupies in compressed form, or `None` if it
/// exceeds [`MAX_COMPRESSED_UINT`].
#[must_use]
pub fn compressed_uint_size(value: u32) -> Option<usize> {
    match value {
        0..=0x7F => Some(1),
        0x80..=0x3FFF => Some(2),
        0x4000..=MAX_COMPRESSED_UINT => Some(4),
        _ => None,
    }
}

/// Appends `value` to `buffer` as a compressed unsigned integer.
///
/// # Errors
/// Returns [`crate::Error::ValueOutOfRange`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match compressed_uint_size(value) {
        Some(1) => buffer.push(value as u8),
        Some(2) => {
            buffer.push(0x80 | (value >> 8) as u8);
            buffer.push(value as u8);
        }
        Some(_) => {
            buffer.push(0xC0 | (value >> 24) as u8);
            buffer.push((value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
        None => {
            return Err(Error::ValueOutOfRange {
                value: i64::from(value),
                message: "compressed unsigned integers are limited to 0x1FFFFFFF",
            })
        }
    }

    Ok(())
}

/// Appends a non-negative `i32` as a compressed unsigned integer.
///
/// Most quantities in the Edit-and-Continue maps are counts, biased ordinals or rebased
/// syntax offsets held in `i32`; this rejects the negative ones instead of wrapping them.
///
/// # Errors
/// Returns [`crate::Error::ValueOutOfRange`] if `value` is negative or too large.
pub fn write_compressed_count(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    let Ok(unsigned) = u32::try_from(value) else {
        return Err(Error::ValueOutOfRange {
            value: i64::from(value),
            message: "value must not be negative",
        });
    };

    write_compressed_uint(unsigned, buffer)
}

/// Appends `value` to `buffer` as a compressed signed integer.
///
/// # Errors
/// Returns [`crate::Error::ValueOutOfRange`] if `value` lies outside
/// [`MIN_COMPRESSED_INT`]`..=`[`MAX_COMPRESSED_INT`].
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    if !(MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT).contains(&value) {
        return Err(Error::ValueOutOfRange {
            value: i64::from(value),
            message: "compressed signed integers are limited to -0x10000000..=0x0FFFFFFF",
        });
    }

    write_compressed_uint(fold_sign(value), buffer)
}

/// Moves the sign of `value` into the lowest bit.
#[must_use]
pub fn fold_sign(value: i32) -> u32 {
    if value < 0 {
        ((!value) as u32) << 1 | 1
    } else {
        (value as u32) << 1
    }
}

/// Inverse of [`fold_sign`].
#[must_use]
pub fn unfold_sign(value: u32) -> i32 {
    #[allow(clippy::cast_possible_wrap)]
    let magnitude = (value >> 1) as i32;
    if value & 1 == 1 {
        !magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use proptest::prelude::*;

    fn encode(value: u32) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_compressed_uint(value, &mut buffer).unwrap();
        buffer
    }

    fn encode_signed(value: i32) -> Vec<u8> {
        let mut buffer = Vec::new();
        write_compressed_int(value, &mut buffer).unwrap();
        buffer
    }

    #[test]
    fn unsigned_boundaries() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(0x7F), [0x7F]);
        assert_eq!(encode(0x80), [0x80, 0x80]);
        assert_eq!(encode(200), [0x80, 0xC8]);
        assert_eq!(encode(0x3FFF), [0xBF, 0xFF]);
        assert_eq!(encode(0x4000), [0xC0, 0x00, 0x40, 0x00]);
        assert_eq!(encode(MAX_COMPRESSED_UINT), [0xDF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn unsigned_out_of_range() {
        let mut buffer = Vec::new();
        assert!(matches!(
            write_compressed_uint(MAX_COMPRESSED_UINT + 1, &mut buffer),
            Err(Error::ValueOutOfRange { .. })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn count_rejects_negative() {
        let mut buffer = Vec::new();
        assert!(write_compressed_count(-1, &mut buffer).is_err());
        write_compressed_count(5, &mut buffer).unwrap();
        assert_eq!(buffer, [0x05]);
    }

    #[test]
    fn signed_folding() {
        assert_eq!(encode_signed(0), [0x00]);
        assert_eq!(encode_signed(10), [20]);
        assert_eq!(encode_signed(-1), [0x01]);
        assert_eq!(encode_signed(-5), [9]);
        assert_eq!(encode_signed(-64), [0x7F]);
        assert_eq!(encode_signed(64), [0x80, 0x80]);
    }

    #[test]
    fn signed_out_of_range() {
        let mut buffer = Vec::new();
        assert!(write_compressed_int(i32::MIN, &mut buffer).is_err());
        assert!(write_compressed_int(i32::MAX, &mut buffer).is_err());
        assert!(write_compressed_int(MIN_COMPRESSED_INT, &mut buffer).is_ok());
        assert!(write_compressed_int(MAX_COMPRESSED_INT, &mut buffer).is_ok());
    }

    #[test]
    fn sizes() {
        assert_eq!(compressed_uint_size(0x7F), Some(1));
        assert_eq!(compressed_uint_size(0x3FFF), Some(2));
        assert_eq!(compressed_uint_size(0x4000), Some(4));
        assert_eq!(compressed_uint_size(u32::MAX), None);
    }

    proptest! {
        #[test]
        fn unsigned_roundtrip(value in 0..=MAX_COMPRESSED_UINT) {
            let buffer = encode(value);
            prop_assert_eq!(Some(buffer.len()), compressed_uint_size(value));

            let mut parser = Parser::new(&buffer);
            prop_assert_eq!(parser.read_compressed_uint().unwrap(), value);
            prop_assert!(!parser.has_more_data());
        }

        #[test]
        fn signed_roundtrip(value in MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT) {
            let buffer = encode_signed(value);

            let mut parser = Parser::new(&buffer);
            prop_assert_eq!(parser.read_compressed_int().unwrap(), value);
            prop_assert!(!parser.has_more_data());
        }

        #[test]
        fn sign_folding_is_bijective(value in any::<i32>()) {
            prop_assert_eq!(unfold_sign(fold_sign(value)), value);
        }
    }
}
