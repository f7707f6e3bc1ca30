//! State machine state map.
//!
//! Suspension points sharing a syntax offset are stored as a group:
//!
//! ```text
//! entry count                                  (compressed)
//! per group, by ascending syntax offset:
//!   syntax offset delta                        (signed; the raw offset for the first group)
//!   group length                               (compressed, at least 1)
//!   state number                  (each entry, signed)
//! ```
//!
//! Await ids are the position of an entry within its group. Since deltas after the first
//! group must be positive, an unsorted map can not be decoded.

use crate::{
    editandcontinue::{
        invalid_data, to_i32,
        types::{AwaitDebugId, StateMachineState, StateMachineStateDebugInfo},
    },
    encoding::compressed::{write_compressed_count, write_compressed_int},
    Error, Parser, Result,
};

/// Appends the state machine state map for `states` to `buffer`.
///
/// `states` must be sorted by syntax offset, and the await ids at each syntax offset must
/// count up from 0.
///
/// # Errors
/// Returns [`crate::Error::ValueOutOfRange`] if `states` is not sorted, an await id is not
/// positional, or a value does not fit the compressed form.
///
/// # Examples
///
/// ```rust
/// use cdiscope::editandcontinue::{
///     statemachine::serialize_state_machine_states, AwaitDebugId, StateMachineState,
///     StateMachineStateDebugInfo,
/// };
///
/// let states = [
///     StateMachineStateDebugInfo::new(0x10, AwaitDebugId::new(0), StateMachineState(0)),
///     StateMachineStateDebugInfo::new(0x10, AwaitDebugId::new(1), StateMachineState(1)),
///     StateMachineStateDebugInfo::new(0x20, AwaitDebugId::new(0), StateMachineState(-3)),
/// ];
///
/// let mut buffer = Vec::new();
/// serialize_state_machine_states(&states, &mut buffer)?;
/// assert_eq!(buffer, [0x03, 0x20, 0x02, 0x00, 0x02, 0x20, 0x01, 0x05]);
/// # Ok::<(), cdiscope::Error>(())
/// ```
pub fn serialize_state_machine_states(
    states: &[StateMachineStateDebugInfo],
    buffer: &mut Vec<u8>,
) -> Result<()> {
    let count = i32::try_from(states.len()).map_err(|_| Error::ValueOutOfRange {
        value: i64::MAX,
        message: "too many state machine states",
    })?;
    write_compressed_count(count, buffer)?;

    let mut previous: Option<i32> = None;
    for group in states.chunk_by(|a, b| a.syntax_offset == b.syntax_offset) {
        let syntax_offset = group[0].syntax_offset;

        let delta = match previous {
            None => syntax_offset,
            Some(previous) if syntax_offset > previous => syntax_offset
                .checked_sub(previous)
                .ok_or(Error::ValueOutOfRange {
                    value: i64::from(syntax_offset),
                    message: "syntax offset is too far from the previous one",
                })?,
            Some(_) => {
                return Err(Error::ValueOutOfRange {
                    value: i64::from(syntax_offset),
                    message: "state machine states are not sorted by syntax offset",
                })
            }
        };

        for (index, state) in group.iter().enumerate() {
            if usize::try_from(state.await_id.relative_state_ordinal).ok() != Some(index) {
                return Err(Error::ValueOutOfRange {
                    value: i64::from(state.await_id.relative_state_ordinal),
                    message: "await ids must count up from 0 at each syntax offset",
                });
            }
        }

        let group_len = i32::try_from(group.len()).map_err(|_| Error::ValueOutOfRange {
            value: i64::MAX,
            message: "too many state machine states at one syntax offset",
        })?;
        write_compressed_int(delta, buffer)?;
        write_compressed_count(group_len, buffer)?;
        for state in group {
            write_compressed_int(state.state_number.0, buffer)?;
        }

        previous = Some(syntax_offset);
    }

    Ok(())
}

/// Decodes a state machine state map.
///
/// An empty map decodes to no states.
///
/// # Errors
/// Returns [`crate::Error::InvalidData`] if the map is truncated, not sorted, declares a group
/// that is empty or larger than the remaining entry count, or is followed by trailing bytes.
#[tracing::instrument(level = "trace", skip_all, fields(len = data.len()))]
pub fn deserialize_state_machine_states(data: &[u8]) -> Result<Vec<StateMachineStateDebugInfo>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new(data);
    read_states(&mut parser).map_err(|_| invalid_data(data, parser.pos()))
}

fn read_states(parser: &mut Parser) -> Result<Vec<StateMachineStateDebugInfo>> {
    let count = parser.read_compressed_uint()? as usize;
    let mut states = Vec::with_capacity(count.min(parser.remaining()));

    let mut previous: Option<i32> = None;
    while states.len() < count {
        let delta = parser.read_compressed_int()?;
        let syntax_offset = match previous {
            None => delta,
            Some(_) if delta <= 0 => {
                return Err(malformed_error!(
                    "State machine states are not sorted - delta {}",
                    delta
                ))
            }
            Some(previous) => previous
                .checked_add(delta)
                .ok_or_else(|| malformed_error!("Syntax offset overflow"))?,
        };

        let group_len = parser.read_compressed_uint()?;
        let left = count - states.len();
        if group_len == 0 || group_len as usize > left {
            return Err(malformed_error!(
                "Invalid state group length {} with {} states left",
                group_len,
                left
            ));
        }

        for ordinal in 0..to_i32(group_len) {
            let state_number = parser.read_compressed_int()?;
            states.push(StateMachineStateDebugInfo::new(
                syntax_offset,
                AwaitDebugId::new(ordinal),
                StateMachineState(state_number),
            ));
        }

        previous = Some(syntax_offset);
    }

    if parser.has_more_data() {
        return Err(malformed_error!(
            "{} trailing bytes after state machine states",
            parser.remaining()
        ));
    }

    Ok(states)
}
