//! Encoder for custom debug information blobs.
//!
//! The [`CustomDebugInfoEncoder`] appends one record per call and assembles the blob with its
//! global header at the end. Each record is framed the same way:
//!
//! ```text
//! version:u8 = 4 | kind:u8 | reserved:u8 = 0 | alignment:u8 | size:u32 LE | payload | padding
//! ```
//!
//! The size covers header, payload and padding, and the padding makes every record end on a
//! 4-byte boundary relative to the start of the blob. Only kinds for which
//! [`CustomDebugInfoKind::supports_alignment`] holds record the padding length in the header.

use widestring::U16String;

use crate::{
    customdebuginfo::types::{
        CustomDebugInfoKind, DynamicLocalInfo, StateMachineHoistedLocalScope,
        TupleElementNamesInfo, CDI_VERSION, DYNAMIC_FLAGS_SIZE, GLOBAL_HEADER_SIZE,
        IDENTIFIER_SIZE, RECORD_ALIGNMENT,
    },
    editandcontinue::{EditAndContinueMethodDebugInformation, UNDEFINED_METHOD_ORDINAL},
    encoding::io::{push_le, write_le_at},
    Error, Result,
};

/// Largest number of records a blob can hold; the global header counts them in one byte.
pub const MAX_RECORD_COUNT: usize = u8::MAX as usize;

/// Builder for custom debug information blobs.
///
/// Records can be added in any order. Adding a record either appends it completely or, on
/// error, leaves the encoder as it was.
///
/// # Usage Pattern
///
/// ```rust
/// use cdiscope::customdebuginfo::{try_get_custom_debug_info_record, CustomDebugInfoEncoder, CustomDebugInfoKind};
///
/// let mut encoder = CustomDebugInfoEncoder::new();
/// encoder.add_using_groups(&[1, 2])?;
/// encoder.add_forward_method_info(0x0600_0001)?;
/// assert_eq!(encoder.record_count(), 2);
///
/// let blob = encoder.to_bytes().unwrap();
/// assert_eq!(blob.len() % 4, 0);
///
/// let forward = try_get_custom_debug_info_record(&blob, CustomDebugInfoKind::ForwardMethodInfo)?;
/// assert_eq!(forward, Some(vec![0x01, 0x00, 0x00, 0x06]));
/// # Ok::<(), cdiscope::Error>(())
/// ```
#[derive(Default)]
pub struct CustomDebugInfoEncoder {
    /// Records appended so far, without the global header
    buffer: Vec<u8>,
    /// Number of records in `buffer`
    record_count: usize,
}

impl CustomDebugInfoEncoder {
    /// Creates a new, empty encoder.
    #[must_use]
    pub fn new() -> Self {
        CustomDebugInfoEncoder {
            buffer: Vec::new(),
            record_count: 0,
        }
    }

    /// Returns the number of records appended so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Returns the complete blob, or `None` if no record was added.
    ///
    /// A method without custom debug information has no blob at all, not an empty one.
    #[must_use]
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        if self.record_count == 0 {
            return None;
        }

        #[allow(clippy::cast_possible_truncation)]
        let record_count = self.record_count as u8;

        let mut blob = Vec::with_capacity(GLOBAL_HEADER_SIZE + self.buffer.len());
        blob.extend_from_slice(&[CDI_VERSION, record_count, 0, 0]);
        blob.extend_from_slice(&self.buffer);
        Some(blob)
    }

    /// Appends a record of `kind` whose payload is produced by `serializer`.
    ///
    /// The size field is reserved before `serializer` runs and filled in afterwards, together
    /// with the alignment padding.
    ///
    /// # Arguments
    ///
    /// * `kind` - Kind written to the record header
    /// * `serializer` - Appends the payload to the buffer it is given
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob already holds [`MAX_RECORD_COUNT`]
    /// records, or any error returned by `serializer`.
    pub fn add_record<F>(&mut self, kind: CustomDebugInfoKind, serializer: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        if self.record_count >= MAX_RECORD_COUNT {
            return Err(Error::TooManyRecords(self.record_count + 1));
        }

        let start = self.buffer.len();
        self.buffer
            .extend_from_slice(&[CDI_VERSION, kind.value(), 0, 0, 0, 0, 0, 0]);

        if let Err(error) = serializer(&mut self.buffer) {
            self.buffer.truncate(start);
            return Err(error);
        }

        // Records are aligned relative to the blob, which starts with the global header
        let end = GLOBAL_HEADER_SIZE + self.buffer.len();
        let padding = (RECORD_ALIGNMENT - end % RECORD_ALIGNMENT) % RECORD_ALIGNMENT;
        self.buffer.resize(self.buffer.len() + padding, 0);

        let size = self.buffer.len() - start;
        let Ok(size) = u32::try_from(size) else {
            self.buffer.truncate(start);
            return Err(Error::ValueOutOfRange {
                value: i64::MAX,
                message: "custom debug info record is too large",
            });
        };

        let mut offset = start + 3;
        #[allow(clippy::cast_possible_truncation)]
        let alignment = if kind.supports_alignment() {
            padding as u8
        } else {
            0
        };
        write_le_at(&mut self.buffer, &mut offset, alignment)?;
        write_le_at(&mut self.buffer, &mut offset, size)?;

        self.record_count += 1;
        tracing::trace!(?kind, size, padding, "added custom debug info record");
        Ok(())
    }

    /// Appends the number of namespace imports of each lexical scope.
    ///
    /// Nothing is appended for an empty list.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or
    /// [`crate::Error::ValueOutOfRange`] for more than `u16::MAX` groups.
    pub fn add_using_groups(&mut self, group_sizes: &[u16]) -> Result<()> {
        if group_sizes.is_empty() {
            return Ok(());
        }

        let count = u16::try_from(group_sizes.len()).map_err(|_| Error::ValueOutOfRange {
            value: i64::MAX,
            message: "too many using groups",
        })?;

        self.add_record(CustomDebugInfoKind::UsingGroups, |buffer| {
            push_le(buffer, count);
            for size in group_sizes {
                push_le(buffer, *size);
            }
            Ok(())
        })
    }

    /// Appends the token of a method whose debug information this method shares.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full.
    pub fn add_forward_method_info(&mut self, token: i32) -> Result<()> {
        self.add_record(CustomDebugInfoKind::ForwardMethodInfo, |buffer| {
            push_le(buffer, token);
            Ok(())
        })
    }

    /// Appends the token of the method carrying the module level imports.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full.
    pub fn add_forward_module_info(&mut self, token: i32) -> Result<()> {
        self.add_record(CustomDebugInfoKind::ForwardModuleInfo, |buffer| {
            push_le(buffer, token);
            Ok(())
        })
    }

    /// Appends the name of the state machine type implementing this method.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or
    /// [`crate::Error::ValueOutOfRange`] if the name contains a null character.
    pub fn add_state_machine_type_name(&mut self, type_name: &str) -> Result<()> {
        self.add_record(CustomDebugInfoKind::StateMachineTypeName, |buffer| {
            check_terminable(type_name, "state machine type name contains a null character")?;
            for unit in U16String::from_str(type_name).as_slice() {
                push_le(buffer, *unit);
            }
            push_le(buffer, 0_u16);
            Ok(())
        })
    }

    /// Appends the scopes of the locals hoisted into state machine fields, in field order.
    ///
    /// Nothing is appended for an empty list.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or
    /// [`crate::Error::ValueOutOfRange`] for an empty scope.
    pub fn add_state_machine_hoisted_local_scopes(
        &mut self,
        scopes: &[StateMachineHoistedLocalScope],
    ) -> Result<()> {
        if scopes.is_empty() {
            return Ok(());
        }

        self.add_record(
            CustomDebugInfoKind::StateMachineHoistedLocalScopes,
            |buffer| {
                push_le(buffer, count_i32(scopes.len())?);
                for scope in scopes {
                    if scope.is_default() {
                        push_le(buffer, 0_i32);
                        push_le(buffer, 0_i32);
                        continue;
                    }

                    if scope.end_offset <= scope.start_offset {
                        return Err(Error::ValueOutOfRange {
                            value: i64::from(scope.end_offset),
                            message: "hoisted local scope must not be empty",
                        });
                    }

                    push_le(buffer, scope.start_offset);
                    push_le(buffer, scope.end_offset - 1);
                }
                Ok(())
            },
        )
    }

    /// Appends the locals and constants declared with a `dynamic` type.
    ///
    /// Each entry occupies a fixed 200 bytes. Flags beyond [`DYNAMIC_FLAGS_SIZE`] and name code
    /// units beyond [`IDENTIFIER_SIZE`] are dropped; callers are expected to filter out such
    /// entries beforehand. Nothing is appended for an empty list.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full.
    pub fn add_dynamic_locals(&mut self, locals: &[DynamicLocalInfo]) -> Result<()> {
        if locals.is_empty() {
            return Ok(());
        }

        self.add_record(CustomDebugInfoKind::DynamicLocals, |buffer| {
            push_le(buffer, count_i32(locals.len())?);
            for local in locals {
                let flag_count = local.flags.len().min(DYNAMIC_FLAGS_SIZE);
                let mut flags = [0_u8; DYNAMIC_FLAGS_SIZE];
                for (slot, flag) in flags.iter_mut().zip(&local.flags) {
                    *slot = u8::from(*flag);
                }
                buffer.extend_from_slice(&flags);

                push_le(buffer, count_i32(flag_count)?);
                push_le(buffer, local.slot_index);

                let name = U16String::from_str(&local.name);
                let mut identifier = [0_u16; IDENTIFIER_SIZE];
                for (slot, unit) in identifier.iter_mut().zip(name.as_slice()) {
                    *slot = *unit;
                }
                for unit in identifier {
                    push_le(buffer, unit);
                }
            }
            Ok(())
        })
    }

    /// Appends the element names of tuple typed locals and constants.
    ///
    /// Names are written as null-terminated UTF-8; an unnamed element is a lone terminator.
    /// Nothing is appended for an empty list.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or
    /// [`crate::Error::ValueOutOfRange`] if an element name or local name contains a null
    /// character.
    pub fn add_tuple_element_names(&mut self, locals: &[TupleElementNamesInfo]) -> Result<()> {
        if locals.is_empty() {
            return Ok(());
        }

        self.add_record(CustomDebugInfoKind::TupleElementNames, |buffer| {
            push_le(buffer, count_i32(locals.len())?);
            for local in locals {
                push_le(buffer, count_i32(local.element_names.len())?);
                for name in local.element_names.iter().flatten() {
                    check_terminable(name, "tuple element name contains a null character")?;
                }
                check_terminable(&local.local_name, "tuple local name contains a null character")?;

                for name in &local.element_names {
                    if let Some(name) = name {
                        buffer.extend_from_slice(name.as_bytes());
                    }
                    buffer.push(0);
                }

                push_le(buffer, local.slot_index);
                push_le(buffer, local.scope_start);
                push_le(buffer, local.scope_end);
                buffer.extend_from_slice(local.local_name.as_bytes());
                buffer.push(0);
            }
            Ok(())
        })
    }

    /// Appends the local slot map of a method.
    ///
    /// Nothing is appended if the method has no local slots.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or the error of
    /// [`EditAndContinueMethodDebugInformation::serialize_local_slots`].
    pub fn add_edit_and_continue_local_slot_map(
        &mut self,
        info: &EditAndContinueMethodDebugInformation,
    ) -> Result<()> {
        if info.local_slots.is_empty() {
            return Ok(());
        }

        self.add_record(CustomDebugInfoKind::EditAndContinueLocalSlotMap, |buffer| {
            info.serialize_local_slots(buffer)
        })
    }

    /// Appends the lambda map of a method.
    ///
    /// A method without closures and lambdas still gets a record holding its method ordinal.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or the error of
    /// [`EditAndContinueMethodDebugInformation::serialize_lambda_map`].
    pub fn add_edit_and_continue_lambda_map(
        &mut self,
        info: &EditAndContinueMethodDebugInformation,
    ) -> Result<()> {
        self.add_record(CustomDebugInfoKind::EditAndContinueLambdaMap, |buffer| {
            info.serialize_lambda_map(buffer)
        })
    }

    /// Appends the state machine state map of a method.
    ///
    /// Nothing is appended if the method has no state machine states.
    ///
    /// # Errors
    /// Returns [`crate::Error::TooManyRecords`] if the blob is full, or the error of
    /// [`EditAndContinueMethodDebugInformation::serialize_state_machine_states`].
    pub fn add_edit_and_continue_state_machine_state_map(
        &mut self,
        info: &EditAndContinueMethodDebugInformation,
    ) -> Result<()> {
        if info.state_machine_states.is_empty() {
            return Ok(());
        }

        self.add_record(
            CustomDebugInfoKind::EditAndContinueStateMachineStateMap,
            |buffer| info.serialize_state_machine_states(buffer),
        )
    }

    /// Appends every non-empty map of a method.
    ///
    /// The lambda map is written if the method has closures or lambdas, or a method ordinal
    /// other than [`UNDEFINED_METHOD_ORDINAL`].
    ///
    /// # Errors
    /// Returns the first error of the individual `add_edit_and_continue_*` operations. Maps
    /// added before the error stay in the encoder.
    pub fn add_edit_and_continue_method_debug_information(
        &mut self,
        info: &EditAndContinueMethodDebugInformation,
    ) -> Result<()> {
        self.add_edit_and_continue_local_slot_map(info)?;
        if info.method_ordinal != UNDEFINED_METHOD_ORDINAL
            || !info.closures.is_empty()
            || !info.lambdas.is_empty()
        {
            self.add_edit_and_continue_lambda_map(info)?;
        }
        self.add_edit_and_continue_state_machine_state_map(info)
    }
}

fn check_terminable(name: &str, message: &'static str) -> Result<()> {
    match name.find('\0') {
        Some(position) => Err(Error::ValueOutOfRange {
            value: i64::try_from(position).unwrap_or(i64::MAX),
            message,
        }),
        None => Ok(()),
    }
}

fn count_i32(count: usize) -> Result<i32> {
    i32::try_from(count).map_err(|_| Error::ValueOutOfRange {
        value: i64::MAX,
        message: "count does not fit a 32-bit integer",
    })
}
