//! Local slot map.
//!
//! One entry per local slot of the method body, in slot order. Short-lived slots are written
//! as a single `0x00` byte so that the indices of the following slots are preserved. A
//! long-lived slot starts with a byte holding `kind + 1` in its low six bits and a flag in bit
//! seven telling whether a non-zero ordinal follows, then the syntax offset relative to the
//! baseline and, if flagged, the ordinal.
//!
//! The baseline is `-1` unless a slot lies further before the method body, in which case the
//! map starts with `0xFF` and the negated baseline.

use crate::{
    editandcontinue::{
        invalid_data, negate, relative_offset, to_i32,
        types::{LocalDebugId, LocalSlotDebugInfo, SynthesizedLocalKind, MAX_SERIALIZED_LOCAL_KIND},
    },
    encoding::compressed::write_compressed_count,
    Error, Parser, Result,
};

/// Marks a syntax offset baseline in a local slot map.
pub const SYNTAX_OFFSET_BASELINE: u8 = 0xFF;

const HAS_ORDINAL: u8 = 0x80;
const KIND_MASK: u8 = 0x3F;

/// Appends the local slot map for `slots` to `buffer`.
///
/// # Errors
/// Returns [`crate::Error::ValueOutOfRange`] for a long-lived kind above
/// [`MAX_SERIALIZED_LOCAL_KIND`], a negative ordinal, or an offset that does not fit the
/// compressed form. `buffer` may hold a partial map afterwards.
pub fn serialize_local_slots(slots: &[LocalSlotDebugInfo], buffer: &mut Vec<u8>) -> Result<()> {
    let baseline = slots
        .iter()
        .filter(|slot| slot.kind.is_long_lived())
        .map(|slot| slot.id.syntax_offset)
        .fold(-1, i32::min);

    if baseline < -1 {
        buffer.push(SYNTAX_OFFSET_BASELINE);
        write_compressed_count(negate(baseline)?, buffer)?;
    }

    for slot in slots {
        if !slot.kind.is_long_lived() {
            buffer.push(0);
            continue;
        }

        let tag = slot.kind.value();
        if tag > MAX_SERIALIZED_LOCAL_KIND {
            return Err(Error::ValueOutOfRange {
                value: i64::from(tag),
                message: "local kind cannot be stored in a local slot map",
            });
        }

        if slot.id.ordinal < 0 {
            return Err(Error::ValueOutOfRange {
                value: i64::from(slot.id.ordinal),
                message: "local ordinal must not be negative",
            });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut header = (tag + 1) as u8;
        if slot.id.ordinal > 0 {
            header |= HAS_ORDINAL;
        }

        buffer.push(header);
        write_compressed_count(relative_offset(slot.id.syntax_offset, baseline)?, buffer)?;
        if slot.id.ordinal > 0 {
            write_compressed_count(slot.id.ordinal, buffer)?;
        }
    }

    Ok(())
}

/// Decodes a local slot map.
///
/// An empty map decodes to no slots.
///
/// # Errors
/// Returns [`crate::Error::InvalidData`] if the map is truncated or malformed.
///
/// # Examples
///
/// ```rust
/// use cdiscope::editandcontinue::slotmap::deserialize_local_slots;
///
/// let error = deserialize_local_slots(&[0x01, 0x68, 0xFF]).unwrap_err();
/// assert_eq!(error.to_string(), "Invalid data at offset 3: 01-68-FF*");
/// ```
#[tracing::instrument(level = "trace", skip_all, fields(len = data.len()))]
pub fn deserialize_local_slots(data: &[u8]) -> Result<Vec<LocalSlotDebugInfo>> {
    let mut parser = Parser::new(data);
    read_slots(&mut parser).map_err(|_| invalid_data(data, parser.pos()))
}

fn read_slots(parser: &mut Parser) -> Result<Vec<LocalSlotDebugInfo>> {
    let mut slots = Vec::new();
    let mut baseline = -1_i32;

    while parser.has_more_data() {
        let header = parser.read_le::<u8>()?;

        if header == SYNTAX_OFFSET_BASELINE {
            baseline = -to_i32(parser.read_compressed_uint()?);
            continue;
        }

        if header == 0 {
            slots.push(LocalSlotDebugInfo::temp());
            continue;
        }

        let Some(tag) = (header & KIND_MASK).checked_sub(1) else {
            return Err(malformed_error!("Local slot header 0x{:02X} has no kind", header));
        };

        let kind = SynthesizedLocalKind::from_tag(tag);
        let syntax_offset = to_i32(parser.read_compressed_uint()?) + baseline;
        let ordinal = if header & HAS_ORDINAL != 0 {
            to_i32(parser.read_compressed_uint()?)
        } else {
            0
        };

        slots.push(LocalSlotDebugInfo::new(
            kind,
            LocalDebugId::new(syntax_offset, ordinal),
        ));
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(kind: SynthesizedLocalKind, offset: i32, ordinal: i32) -> LocalSlotDebugInfo {
        LocalSlotDebugInfo::new(kind, LocalDebugId::new(offset, ordinal))
    }

    fn encode(slots: &[LocalSlotDebugInfo]) -> Vec<u8> {
        let mut buffer = Vec::new();
        serialize_local_slots(slots, &mut buffer).unwrap();
        buffer
    }

    #[test]
    fn user_defined_at_ordinal_zero_is_two_bytes() {
        let bytes = encode(&[slot(SynthesizedLocalKind::UserDefined, 10, 0)]);
        assert_eq!(bytes, [0x01, 11]);
    }

    #[test]
    fn ordinal_flag() {
        let bytes = encode(&[slot(SynthesizedLocalKind::Awaiter, 0, 3)]);
        assert_eq!(bytes, [0x80 | 29, 1, 3]);
    }

    #[test]
    fn gaps_are_preserved() {
        let slots = [
            slot(SynthesizedLocalKind::UserDefined, 0, 0),
            LocalSlotDebugInfo::temp(),
            slot(SynthesizedLocalKind::Lock, 5, 1),
        ];
        let bytes = encode(&slots);
        assert_eq!(bytes[2], 0x00);
        assert_eq!(deserialize_local_slots(&bytes).unwrap(), slots);
    }

    #[test]
    fn short_lived_kinds_become_placeholders() {
        let bytes = encode(&[slot(SynthesizedLocalKind::EmitterTemp, 40, 2)]);
        assert_eq!(bytes, [0x00]);
        assert_eq!(
            deserialize_local_slots(&bytes).unwrap(),
            [LocalSlotDebugInfo::temp()]
        );
    }

    #[test]
    fn negative_offsets_write_baseline() {
        let slots = [
            slot(SynthesizedLocalKind::UserDefined, -20, 0),
            slot(SynthesizedLocalKind::ForEachEnumerator, 7, 0),
        ];
        let bytes = encode(&slots);
        assert_eq!(bytes[..2], [SYNTAX_OFFSET_BASELINE, 20]);
        assert_eq!(deserialize_local_slots(&bytes).unwrap(), slots);
    }

    #[test]
    fn offset_minus_one_needs_no_baseline() {
        let bytes = encode(&[slot(SynthesizedLocalKind::UserDefined, -1, 0)]);
        assert_eq!(bytes, [0x01, 0x00]);
    }

    #[test]
    fn unknown_kinds_roundtrip() {
        let slots = [slot(SynthesizedLocalKind::Unknown(61), 1, 0)];
        assert_eq!(deserialize_local_slots(&encode(&slots)).unwrap(), slots);
    }

    #[test]
    fn rejects_unrepresentable_slots() {
        let mut buffer = Vec::new();
        assert!(
            serialize_local_slots(&[slot(SynthesizedLocalKind::Unknown(62), 0, 0)], &mut buffer)
                .is_err()
        );
        assert!(
            serialize_local_slots(&[slot(SynthesizedLocalKind::UserDefined, 0, -1)], &mut buffer)
                .is_err()
        );
    }

    #[test]
    fn truncated_ordinal() {
        let error = deserialize_local_slots(&[0x81, 0x05]).unwrap_err();
        assert_eq!(error.to_string(), "Invalid data at offset 2: 81-05*");
    }

    #[test]
    fn header_without_kind() {
        assert!(matches!(
            deserialize_local_slots(&[0x80, 0x00]),
            Err(Error::InvalidData { offset: 1, .. })
        ));
    }

    #[test]
    fn empty_map() {
        assert!(deserialize_local_slots(&[]).unwrap().is_empty());
    }
}
