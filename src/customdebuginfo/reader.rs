//! Lazy reading of custom debug information blobs.
//!
//! A blob is a 4-byte global header followed by self-describing records, each carrying its
//! own total size. Records are yielded one at a time, so a lookup for a single kind stops
//! parsing as soon as it finds a match and never validates the records behind it.
//!
//! # Examples
//!
//! ```rust
//! use cdiscope::customdebuginfo::{custom_debug_info_records, CustomDebugInfoKind};
//!
//! let blob = [
//!     0x04, 0x01, 0x00, 0x00, // global header
//!     0x04, 0x01, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00, // forward method info
//!     0x01, 0x00, 0x00, 0x06,
//! ];
//!
//! for record in custom_debug_info_records(&blob)? {
//!     let record = record?;
//!     assert_eq!(record.kind, CustomDebugInfoKind::ForwardMethodInfo);
//!     assert_eq!(record.data, [0x01, 0x00, 0x00, 0x06]);
//! }
//! # Ok::<(), cdiscope::Error>(())
//! ```

use std::iter::FusedIterator;

use crate::{
    customdebuginfo::types::{
        CustomDebugInfoKind, CustomDebugInfoRecord, CDI_VERSION, GLOBAL_HEADER_SIZE,
        RECORD_ALIGNMENT, RECORD_HEADER_SIZE,
    },
    Parser, Result,
};

/// Iterator over the records of a custom debug information blob.
///
/// Created by [`custom_debug_info_records`]. After the first error the iterator is
/// exhausted; a corrupted record header makes every following offset meaningless.
pub struct CustomDebugInfoRecords<'a> {
    parser: Parser<'a>,
    finished: bool,
}

impl<'a> CustomDebugInfoRecords<'a> {
    fn new(parser: Parser<'a>, finished: bool) -> Self {
        CustomDebugInfoRecords { parser, finished }
    }

    fn read_record(&mut self) -> Result<CustomDebugInfoRecord> {
        let start = self.parser.pos();
        if self.parser.remaining() < RECORD_HEADER_SIZE {
            return Err(malformed_error!(
                "Truncated record header at offset {} - {} bytes left",
                start,
                self.parser.remaining()
            ));
        }

        let version = self.parser.read_le::<u8>()?;
        let kind = CustomDebugInfoKind::from_byte(self.parser.read_le::<u8>()?);
        self.parser.advance_by(1)?;
        let alignment_size = self.parser.read_le::<u8>()?;
        let size = self.parser.read_le::<u32>()?;

        let alignment_size = if kind.supports_alignment() {
            usize::from(alignment_size)
        } else {
            0
        };

        if i32::try_from(size).is_err() {
            return Err(malformed_error!(
                "Invalid record size 0x{:08X} at offset {}",
                size,
                start
            ));
        }

        let size = size as usize;
        if size < RECORD_HEADER_SIZE {
            return Err(malformed_error!(
                "Record size {} at offset {} is smaller than the record header",
                size,
                start
            ));
        }

        let body_size = size - RECORD_HEADER_SIZE;
        if body_size > self.parser.remaining() {
            return Err(malformed_error!(
                "Record at offset {} with size {} exceeds the blob - {} bytes left",
                start,
                size,
                self.parser.remaining()
            ));
        }

        if alignment_size >= RECORD_ALIGNMENT || alignment_size > body_size {
            return Err(malformed_error!(
                "Bad alignment {} for {:?} record at offset {}",
                alignment_size,
                kind,
                start
            ));
        }

        let data = self.parser.read_bytes(body_size - alignment_size)?.to_vec();
        self.parser.advance_by(alignment_size)?;

        tracing::trace!(offset = start, ?kind, size, "read custom debug info record");

        Ok(CustomDebugInfoRecord {
            kind,
            version,
            data,
        })
    }
}

impl Iterator for CustomDebugInfoRecords<'_> {
    type Item = Result<CustomDebugInfoRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || !self.parser.has_more_data() {
            return None;
        }

        let record = self.read_record();
        if record.is_err() {
            self.finished = true;
        }
        Some(record)
    }
}

impl FusedIterator for CustomDebugInfoRecords<'_> {}

/// Iterates the records of a custom debug information blob.
///
/// The record count of the global header is informational and ignored; records are read
/// until the blob is exhausted. A blob whose global version is not [`CDI_VERSION`] was written
/// by an incompatible producer and yields no records.
///
/// # Arguments
///
/// * `blob` - The complete custom debug information blob, starting with the global header
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `blob` is too short to hold the global header. Errors
/// in individual records are reported by the iterator.
#[tracing::instrument(level = "trace", skip_all, fields(len = blob.len()))]
pub fn custom_debug_info_records(blob: &[u8]) -> Result<CustomDebugInfoRecords<'_>> {
    if blob.len() < GLOBAL_HEADER_SIZE {
        return Err(malformed_error!(
            "Custom debug info blob of {} bytes is too short for the global header",
            blob.len()
        ));
    }

    let mut parser = Parser::new(blob);
    let version = parser.read_le::<u8>()?;
    parser.advance_by(GLOBAL_HEADER_SIZE - 1)?;

    if version != CDI_VERSION {
        tracing::debug!(version, "ignoring custom debug info with unsupported version");
        return Ok(CustomDebugInfoRecords::new(parser, true));
    }

    Ok(CustomDebugInfoRecords::new(parser, false))
}

/// Returns the payload of the first record of `kind` in `blob`.
///
/// Records of other kinds, including unknown ones, are skipped. Records following the first
/// match are not examined.
///
/// # Arguments
///
/// * `blob` - The complete custom debug information blob
/// * `kind` - The record kind to look for
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the blob is shorter than the global header or a record
/// before the first match is corrupted.
///
/// # Examples
///
/// ```rust
/// use cdiscope::customdebuginfo::{try_get_custom_debug_info_record, CustomDebugInfoKind};
///
/// let blob = [0x04, 0x00, 0x00, 0x00];
/// let data = try_get_custom_debug_info_record(&blob, CustomDebugInfoKind::UsingGroups)?;
/// assert!(data.is_none());
/// # Ok::<(), cdiscope::Error>(())
/// ```
pub fn try_get_custom_debug_info_record(
    blob: &[u8],
    kind: CustomDebugInfoKind,
) -> Result<Option<Vec<u8>>> {
    for record in custom_debug_info_records(blob)? {
        let record = record?;
        if record.kind == kind {
            return Ok(Some(record.data));
        }

        if let CustomDebugInfoKind::Unknown(value) = record.kind {
            tracing::debug!(kind = value, "skipping unknown custom debug info record");
        }
    }

    Ok(None)
}
