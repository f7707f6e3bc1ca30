//! Record kinds, records and format constants of the custom debug information container.

use strum::EnumIter;

/// Version byte written by every current producer, both in the global header and in each
/// record header.
pub const CDI_VERSION: u8 = 4;

/// Size of the global header: version, record count and two bytes of padding.
pub const GLOBAL_HEADER_SIZE: usize = 4;

/// Size of a record header: version, kind, reserved byte, alignment size and a `u32` total size.
pub const RECORD_HEADER_SIZE: usize = 8;

/// Records end on multiples of this many bytes, relative to the start of the blob.
pub const RECORD_ALIGNMENT: usize = 4;

/// Width of the flags field of a dynamic locals entry, in bytes.
pub const DYNAMIC_FLAGS_SIZE: usize = 64;

/// Width of the name field of a dynamic locals entry, in UTF-16 code units.
pub const IDENTIFIER_SIZE: usize = 64;

/// Identifies the payload format of a custom debug information record.
///
/// The numeric values are an external contract shared with debuggers and PDB tooling; new
/// kinds are only ever appended. Bytes that do not name a known kind decode as
/// [`CustomDebugInfoKind::Unknown`] and are skipped by lookups rather than rejected.
///
/// ## Alignment
///
/// Only [`CustomDebugInfoKind::EditAndContinueLocalSlotMap`],
/// [`CustomDebugInfoKind::EditAndContinueLambdaMap`],
/// [`CustomDebugInfoKind::TupleElementNames`] and
/// [`CustomDebugInfoKind::EditAndContinueStateMachineStateMap`] declare their padding in the
/// record header. Older kinds predate the alignment field and reuse those header bytes, so the
/// reader never interprets them. See [`CustomDebugInfoKind::supports_alignment`].
///
/// # Examples
///
/// ```rust
/// use cdiscope::customdebuginfo::CustomDebugInfoKind;
/// use strum::IntoEnumIterator;
///
/// assert_eq!(CustomDebugInfoKind::from_byte(7), CustomDebugInfoKind::EditAndContinueLambdaMap);
/// assert_eq!(CustomDebugInfoKind::from_byte(42), CustomDebugInfoKind::Unknown(42));
///
/// let aligned = CustomDebugInfoKind::iter().filter(|kind| kind.supports_alignment()).count();
/// assert_eq!(aligned, 4);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumIter)]
pub enum CustomDebugInfoKind {
    /// `UsingGroups` (0x00) - Number of namespace imports per lexical scope
    UsingGroups,
    /// `ForwardMethodInfo` (0x01) - Token of a method whose debug info applies to this one
    ForwardMethodInfo,
    /// `ForwardModuleInfo` (0x02) - Token of a method carrying the module level imports
    ForwardModuleInfo,
    /// `StateMachineHoistedLocalScopes` (0x03) - Scopes of locals hoisted into a state machine
    StateMachineHoistedLocalScopes,
    /// `StateMachineTypeName` (0x04) - Name of the state machine type of an async or iterator method
    StateMachineTypeName,
    /// `DynamicLocals` (0x05) - Locals and constants declared with a `dynamic` type
    DynamicLocals,
    /// `EditAndContinueLocalSlotMap` (0x06) - Identities of the method's local slots
    EditAndContinueLocalSlotMap,
    /// `EditAndContinueLambdaMap` (0x07) - Identities of the method's closures and lambdas
    EditAndContinueLambdaMap,
    /// `TupleElementNames` (0x08) - Element names of tuple typed locals and constants
    TupleElementNames,
    /// `EditAndContinueStateMachineStateMap` (0x09) - State numbers of await and yield points
    EditAndContinueStateMachineStateMap,
    /// A kind this crate does not know about
    #[strum(disabled)]
    Unknown(u8),
}

impl CustomDebugInfoKind {
    /// Returns the byte stored in a record header for this kind.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            CustomDebugInfoKind::UsingGroups => 0,
            CustomDebugInfoKind::ForwardMethodInfo => 1,
            CustomDebugInfoKind::ForwardModuleInfo => 2,
            CustomDebugInfoKind::StateMachineHoistedLocalScopes => 3,
            CustomDebugInfoKind::StateMachineTypeName => 4,
            CustomDebugInfoKind::DynamicLocals => 5,
            CustomDebugInfoKind::EditAndContinueLocalSlotMap => 6,
            CustomDebugInfoKind::EditAndContinueLambdaMap => 7,
            CustomDebugInfoKind::TupleElementNames => 8,
            CustomDebugInfoKind::EditAndContinueStateMachineStateMap => 9,
            CustomDebugInfoKind::Unknown(value) => value,
        }
    }

    /// Maps a record header kind byte to its [`CustomDebugInfoKind`].
    #[must_use]
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => CustomDebugInfoKind::UsingGroups,
            1 => CustomDebugInfoKind::ForwardMethodInfo,
            2 => CustomDebugInfoKind::ForwardModuleInfo,
            3 => CustomDebugInfoKind::StateMachineHoistedLocalScopes,
            4 => CustomDebugInfoKind::StateMachineTypeName,
            5 => CustomDebugInfoKind::DynamicLocals,
            6 => CustomDebugInfoKind::EditAndContinueLocalSlotMap,
            7 => CustomDebugInfoKind::EditAndContinueLambdaMap,
            8 => CustomDebugInfoKind::TupleElementNames,
            9 => CustomDebugInfoKind::EditAndContinueStateMachineStateMap,
            other => CustomDebugInfoKind::Unknown(other),
        }
    }

    /// Returns `true` if records of this kind declare their alignment padding in the header.
    #[must_use]
    pub fn supports_alignment(self) -> bool {
        matches!(
            self,
            CustomDebugInfoKind::EditAndContinueLocalSlotMap
                | CustomDebugInfoKind::EditAndContinueLambdaMap
                | CustomDebugInfoKind::TupleElementNames
                | CustomDebugInfoKind::EditAndContinueStateMachineStateMap
        )
    }
}

/// A single record of a custom debug information blob.
///
/// The payload excludes the record header and any alignment padding the header declares. It
/// is an owned copy, independent of the blob it was read from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CustomDebugInfoRecord {
    /// Kind of the record, selecting the payload format
    pub kind: CustomDebugInfoKind,
    /// Version byte of the record header
    pub version: u8,
    /// Payload bytes
    pub data: Vec<u8>,
}

/// A local or constant declared with a `dynamic` type.
///
/// `flags` holds one entry per type node of the declared type, in pre-order, telling which of
/// them are `dynamic`. At most [`DYNAMIC_FLAGS_SIZE`] flags and [`IDENTIFIER_SIZE`] name code
/// units are stored; longer values are truncated.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DynamicLocalInfo {
    /// Name of the local or constant
    pub name: String,
    /// Dynamic flags of the type nodes
    pub flags: Vec<bool>,
    /// Slot of the local, or 0 for a constant
    pub slot_index: i32,
}

/// Element names of a tuple typed local or constant.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TupleElementNamesInfo {
    /// Name of each tuple element, `None` for unnamed elements
    pub element_names: Vec<Option<String>>,
    /// Slot of the local, or -1 for a constant identified by `local_name`
    pub slot_index: i32,
    /// Name of the local or constant
    pub local_name: String,
    /// First IL offset of the constant's scope, 0 for locals
    pub scope_start: i32,
    /// Last IL offset of the constant's scope, 0 for locals
    pub scope_end: i32,
}

/// IL range of a local hoisted into a state machine field.
///
/// `end_offset` is exclusive. The default value, `(0, 0)`, marks a field that does not hold a
/// hoisted local; on the wire it is indistinguishable from the scope `0..1`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct StateMachineHoistedLocalScope {
    /// First IL offset of the scope
    pub start_offset: i32,
    /// IL offset just past the scope
    pub end_offset: i32,
}

impl StateMachineHoistedLocalScope {
    /// Creates a new [`StateMachineHoistedLocalScope`].
    #[must_use]
    pub fn new(start_offset: i32, end_offset: i32) -> Self {
        StateMachineHoistedLocalScope {
            start_offset,
            end_offset,
        }
    }

    /// Returns `true` if this is the placeholder for a field without a hoisted local.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.start_offset == 0 && self.end_offset == 0
    }
}
