//! Cursor-based byte parser for custom debug information payloads.
//!
//! This module provides the [`crate::encoding::parser::Parser`] type, a bounds-checked cursor over
//! an immutable byte slice. Every record decoder and every Edit-and-Continue map decoder in this
//! crate reads through it.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::encoding::parser::Parser::pos`] - Current position
//! - [`crate::encoding::parser::Parser::advance_by`] - Skip bytes
//! - [`crate::encoding::parser::Parser::remaining`] - Bytes left after the cursor
//! - [`crate::encoding::parser::Parser::transactional`] - Roll back the cursor on failure
//!
//! ## Data Access Methods
//! - [`crate::encoding::parser::Parser::read_le`] - Fixed-width little-endian integers
//! - [`crate::encoding::parser::Parser::read_bytes`] - Borrowed byte ranges
//! - [`crate::encoding::parser::Parser::read_compressed_uint`] - Compressed unsigned integers
//! - [`crate::encoding::parser::Parser::read_compressed_int`] - Compressed signed integers
//! - [`crate::encoding::parser::Parser::read_string_utf8`] - Null-terminated UTF-8 strings
//! - [`crate::encoding::parser::Parser::read_string_utf16`] - Null-terminated UTF-16 strings
//!
//! # Examples
//!
//! ```rust
//! use cdiscope::Parser;
//!
//! let data = [0x04, 0x01, 0x00, 0x00, 0x80, 0xC8];
//! let mut parser = Parser::new(&data);
//!
//! let version = parser.read_le::<u8>()?;
//! let count = parser.read_le::<u8>()?;
//! parser.advance_by(2)?;
//! let value = parser.read_compressed_uint()?;
//!
//! assert_eq!((version, count, value), (4, 1, 200));
//! assert!(!parser.has_more_data());
//! # Ok::<(), cdiscope::Error>(())
//! ```

use widestring::U16Str;

use crate::{
    encoding::{
        compressed::unfold_sign,
        io::{read_le_at, WireIO},
    },
    Result,
};

/// A bounds-checked cursor over a byte slice.
///
/// The parser never reads past the end of its data; every failing read returns an error
/// and leaves the position where it was, so decoders can report the exact offset at which
/// a blob stopped making sense.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a cursor positioned at the first byte of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns `true` while at least one byte is left.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Offset of the cursor from the start of the data.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Skips `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes are left; the cursor
    /// does not move.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Returns the byte under the cursor without consuming it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| out_of_bounds_error!())
    }

    /// Execute a closure transactionally, rolling back on failure.
    ///
    /// The parser position is saved before calling `f` and restored if `f` returns an error,
    /// so a failed speculative read consumes nothing.
    ///
    /// # Errors
    /// Returns any error produced by the closure `f`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdiscope::Parser;
    ///
    /// let mut parser = Parser::new(&[0x01]);
    /// let result: cdiscope::Result<u32> = parser.transactional(|p| p.read_le());
    /// assert!(result.is_err());
    /// assert_eq!(parser.pos(), 0);
    /// ```
    pub fn transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let saved_position = self.position;
        let result = f(self);
        if result.is_err() {
            self.position = saved_position;
        }
        result
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: WireIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read `count` bytes as a slice borrowed from the underlying data.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    /// Read a compressed unsigned integer as defined in ECMA-335 II.23.2.
    ///
    /// - Values 0-127: 1 byte (0xxxxxxx)
    /// - Values 128-16383: 2 bytes (10xxxxxx xxxxxxxx)
    /// - Values 16384-536870911: 4 bytes (110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx)
    ///
    /// The position is left untouched if the value cannot be read.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the encoding is truncated or
    /// [`crate::Error::Malformed`] for a first byte of the form `111xxxxx`.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.peek_byte()?;

        let length = match first_byte {
            0x00..=0x7F => 1,
            0x80..=0xBF => 2,
            0xC0..=0xDF => 4,
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed uint - 0x{:02X} at offset {}",
                    first_byte,
                    self.position
                ))
            }
        };

        let bytes = self.transactional(|parser| parser.read_bytes(length))?;
        let value = match *bytes {
            [b0] => u32::from(b0),
            [b0, b1] => (u32::from(b0 & 0x3F) << 8) | u32::from(b1),
            [b0, b1, b2, b3] => {
                (u32::from(b0 & 0x1F) << 24)
                    | (u32::from(b1) << 16)
                    | (u32::from(b2) << 8)
                    | u32::from(b3)
            }
            _ => return Err(out_of_bounds_error!()),
        };

        Ok(value)
    }

    /// Read a compressed signed integer.
    ///
    /// The value is stored as a compressed unsigned integer with the sign folded into the
    /// lowest bit, see [`crate::encoding::compressed::fold_sign`].
    ///
    /// # Errors
    /// Same as [`Parser::read_compressed_uint`].
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        Ok(unfold_sign(self.read_compressed_uint()?))
    }

    /// Read a UTF-8 encoded null-terminated string.
    ///
    /// The terminator is required: a string running to the end of the data is truncated
    /// input, not a valid string.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found or
    /// [`crate::Error::Malformed`] for invalid UTF-8.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let Some(length) = self.data[start..].iter().position(|byte| *byte == 0) else {
            return Err(out_of_bounds_error!());
        };

        let string_data = &self.data[start..start + length];
        let string = String::from_utf8(string_data.to_vec()).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                start + length,
                e.utf8_error()
            )
        })?;

        self.position = start + length + 1;
        Ok(string)
    }

    /// Read a UTF-16 encoded null-terminated string.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found or
    /// [`crate::Error::Malformed`] for unpaired surrogates.
    pub fn read_string_utf16(&mut self) -> Result<String> {
        let start = self.position;
        self.transactional(|parser| {
            let mut units = Vec::new();
            loop {
                let unit = parser.read_le::<u16>()?;
                if unit == 0 {
                    break;
                }
                units.push(unit);
            }

            U16Str::from_slice(&units).to_string().map_err(|e| {
                malformed_error!("Invalid UTF-16 string at offset {}: {}", start, e)
            })
        })
    }

    /// Read a fixed-width field of `units` UTF-16 code units holding a null-padded string.
    ///
    /// The whole field is always consumed; the string ends at the first null unit or at the
    /// end of the field.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the field is truncated or
    /// [`crate::Error::Malformed`] for unpaired surrogates.
    pub fn read_fixed_string_utf16(&mut self, units: usize) -> Result<String> {
        let start = self.position;
        let Some(byte_len) = units.checked_mul(2) else {
            return Err(out_of_bounds_error!());
        };
        let bytes = self.read_bytes(byte_len)?;

        let code_units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|unit| *unit != 0)
            .collect();

        U16Str::from_slice(&code_units)
            .to_string()
            .map_err(|e| malformed_error!("Invalid UTF-16 string at offset {}: {}", start, e))
    }
}
