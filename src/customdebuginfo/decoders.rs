//! Decoders for the payloads of the fixed-layout record kinds.
//!
//! Each function takes the `data` of a [`crate::customdebuginfo::CustomDebugInfoRecord`] of the
//! matching kind. Kinds that do not declare their alignment may carry up to three bytes of
//! padding after the payload; decoders stop at the end of the logical payload and ignore it.
//! The Edit-and-Continue maps are decoded by [`crate::editandcontinue`].

use crate::{
    customdebuginfo::types::{
        DynamicLocalInfo, StateMachineHoistedLocalScope, TupleElementNamesInfo,
        DYNAMIC_FLAGS_SIZE, IDENTIFIER_SIZE,
    },
    Parser, Result,
};

/// Decodes a `UsingGroups` payload into the number of imports of each scope.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the payload is truncated.
///
/// # Examples
///
/// ```rust
/// use cdiscope::customdebuginfo::decode_using_groups;
///
/// assert_eq!(decode_using_groups(&[0x02, 0x00, 0x01, 0x00, 0x05, 0x00])?, [1, 5]);
/// # Ok::<(), cdiscope::Error>(())
/// ```
pub fn decode_using_groups(data: &[u8]) -> Result<Vec<u16>> {
    let mut parser = Parser::new(data);
    let count = parser.read_le::<u16>()?;

    let mut groups = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        groups.push(parser.read_le::<u16>()?);
    }

    Ok(groups)
}

/// Decodes the token of a `ForwardMethodInfo` or `ForwardModuleInfo` payload.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the payload is shorter than 4 bytes.
pub fn decode_forward_record(data: &[u8]) -> Result<i32> {
    Parser::new(data).read_le::<i32>()
}

/// Decodes a `StateMachineTypeName` payload.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the name is not terminated, or
/// [`crate::Error::Malformed`] if it is not valid UTF-16.
pub fn decode_state_machine_type_name(data: &[u8]) -> Result<String> {
    Parser::new(data).read_string_utf16()
}

/// Decodes a `StateMachineHoistedLocalScopes` payload.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the payload is truncated, or
/// [`crate::Error::Malformed`] for a negative count or a scope ending at `i32::MAX`.
pub fn decode_state_machine_hoisted_local_scopes(
    data: &[u8],
) -> Result<Vec<StateMachineHoistedLocalScope>> {
    let mut parser = Parser::new(data);
    let count = read_count(&mut parser)?;

    let mut scopes = Vec::with_capacity(count.min(parser.remaining() / 8));
    for _ in 0..count {
        let start_offset = parser.read_le::<i32>()?;
        let last_offset = parser.read_le::<i32>()?;

        if start_offset == 0 && last_offset == 0 {
            scopes.push(StateMachineHoistedLocalScope::default());
            continue;
        }

        let Some(end_offset) = last_offset.checked_add(1) else {
            return Err(malformed_error!("Hoisted local scope end {} overflows", last_offset));
        };
        scopes.push(StateMachineHoistedLocalScope::new(start_offset, end_offset));
    }

    Ok(scopes)
}

/// Decodes a `DynamicLocals` payload.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the payload is truncated, or
/// [`crate::Error::Malformed`] for a negative count or a name that is not valid UTF-16.
pub fn decode_dynamic_locals(data: &[u8]) -> Result<Vec<DynamicLocalInfo>> {
    let mut parser = Parser::new(data);
    let count = read_count(&mut parser)?;

    let mut locals = Vec::with_capacity(count.min(parser.remaining() / 200));
    for _ in 0..count {
        let flag_bytes = parser.read_bytes(DYNAMIC_FLAGS_SIZE)?;
        let flag_count = read_count(&mut parser)?.min(DYNAMIC_FLAGS_SIZE);
        let slot_index = parser.read_le::<i32>()?;
        let name = parser.read_fixed_string_utf16(IDENTIFIER_SIZE)?;

        locals.push(DynamicLocalInfo {
            name,
            flags: flag_bytes[..flag_count]
                .iter()
                .map(|flag| *flag != 0)
                .collect(),
            slot_index,
        });
    }

    Ok(locals)
}

/// Decodes a `TupleElementNames` payload.
///
/// Unnamed elements decode as `None`; an element explicitly named with an empty string can
/// not be told apart from an unnamed one.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the payload is truncated or a name is not
/// terminated, or [`crate::Error::Malformed`] for a negative count or invalid UTF-8.
pub fn decode_tuple_element_names(data: &[u8]) -> Result<Vec<TupleElementNamesInfo>> {
    let mut parser = Parser::new(data);
    let count = read_count(&mut parser)?;

    let mut locals = Vec::with_capacity(count.min(parser.remaining()));
    for _ in 0..count {
        let name_count = read_count(&mut parser)?;

        let mut element_names = Vec::with_capacity(name_count.min(parser.remaining()));
        for _ in 0..name_count {
            let name = parser.read_string_utf8()?;
            element_names.push(if name.is_empty() { None } else { Some(name) });
        }

        let slot_index = parser.read_le::<i32>()?;
        let scope_start = parser.read_le::<i32>()?;
        let scope_end = parser.read_le::<i32>()?;
        let local_name = parser.read_string_utf8()?;

        locals.push(TupleElementNamesInfo {
            element_names,
            slot_index,
            local_name,
            scope_start,
            scope_end,
        });
    }

    Ok(locals)
}

fn read_count(parser: &mut Parser) -> Result<usize> {
    let count = parser.read_le::<i32>()?;
    usize::try_from(count).map_err(|_| malformed_error!("Negative count {}", count))
}
