//! Edit-and-Continue method debug information.
//!
//! Three independent maps describe how a compiled method relates to its source, so that a
//! later generation of the method can be matched against it:
//!
//! - the local slot map ([`crate::editandcontinue::slotmap`]) identifies every local slot,
//! - the lambda map ([`crate::editandcontinue::lambdamap`]) identifies closures and lambdas,
//! - the state machine state map ([`crate::editandcontinue::statemachine`]) assigns state
//!   numbers to await and yield points.
//!
//! [`crate::editandcontinue::EditAndContinueMethodDebugInformation`] bundles all three. Every
//! map is stored as compressed integers (see [`crate::encoding::compressed`]); a map that
//! cannot be decoded is reported as [`crate::Error::InvalidData`] with a hex dump around the
//! failing offset.
//!
//! # Examples
//!
//! ```rust
//! use cdiscope::editandcontinue::{
//!     EditAndContinueMethodDebugInformation, LocalDebugId, LocalSlotDebugInfo,
//!     SynthesizedLocalKind,
//! };
//!
//! let info = EditAndContinueMethodDebugInformation {
//!     local_slots: vec![
//!         LocalSlotDebugInfo::new(SynthesizedLocalKind::UserDefined, LocalDebugId::new(10, 0)),
//!         LocalSlotDebugInfo::temp(),
//!     ],
//!     ..Default::default()
//! };
//!
//! let mut slot_map = Vec::new();
//! info.serialize_local_slots(&mut slot_map)?;
//!
//! let decoded = EditAndContinueMethodDebugInformation::create(&slot_map, &[], &[])?;
//! assert_eq!(decoded.local_slots, info.local_slots);
//! # Ok::<(), cdiscope::Error>(())
//! ```

mod method;
mod types;

pub mod lambdamap;
pub mod slotmap;
pub mod statemachine;

pub use method::{EditAndContinueMethodDebugInformation, UNDEFINED_METHOD_ORDINAL};
pub use types::*;

use crate::{Error, Result};

/// Number of bytes shown on each side of the failing offset in [`crate::Error::InvalidData`].
pub const INVALID_DATA_WINDOW: usize = 512;

/// Builds the [`crate::Error::InvalidData`] for a map that failed to decode at `offset`.
///
/// The window lists the bytes before `offset`, a `*`, then the bytes from `offset` on, each as
/// two uppercase hex digits separated by `-`. A window clipped at either end is marked `...`.
pub(crate) fn invalid_data(data: &[u8], offset: usize) -> Error {
    let offset = offset.min(data.len());
    let start = offset.saturating_sub(INVALID_DATA_WINDOW);
    let end = offset.saturating_add(INVALID_DATA_WINDOW).min(data.len());

    let window = format!(
        "{}{}*{}{}",
        if start != 0 { "..." } else { "" },
        hex_bytes(&data[start..offset]),
        hex_bytes(&data[offset..end]),
        if end != data.len() { "..." } else { "" },
    );

    tracing::debug!(offset, "invalid Edit-and-Continue map");
    Error::InvalidData { offset, window }
}

/// Converts a decoded compressed integer, which never exceeds 29 bits.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn to_i32(value: u32) -> i32 {
    value as i32
}

pub(crate) fn negate(baseline: i32) -> Result<i32> {
    baseline.checked_neg().ok_or(Error::ValueOutOfRange {
        value: i64::from(baseline),
        message: "syntax offset baseline cannot be negated",
    })
}

pub(crate) fn relative_offset(syntax_offset: i32, baseline: i32) -> Result<i32> {
    syntax_offset
        .checked_sub(baseline)
        .ok_or(Error::ValueOutOfRange {
            value: i64::from(syntax_offset),
            message: "syntax offset is too far from the baseline",
        })
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join("-")
}
