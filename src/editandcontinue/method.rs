//! Per-method aggregate of the three Edit-and-Continue maps.
//!
//! [`EditAndContinueMethodDebugInformation`] is what a compiler emits for one method and what a
//! later compilation reads back to match locals, closures and suspension points.

use crate::{
    customdebuginfo::{try_get_custom_debug_info_record, CustomDebugInfoKind},
    editandcontinue::{
        lambdamap::{deserialize_lambda_map, serialize_lambda_map},
        slotmap::{deserialize_local_slots, serialize_local_slots},
        statemachine::{deserialize_state_machine_states, serialize_state_machine_states},
        types::{ClosureDebugInfo, LambdaDebugInfo, LocalSlotDebugInfo, StateMachineStateDebugInfo},
    },
    Result,
};

/// Method ordinal of a method that is not overloaded by a synthesized counterpart.
pub const UNDEFINED_METHOD_ORDINAL: i32 = -1;

/// Everything Edit-and-Continue persists about one compiled method.
///
/// Each of the three maps is stored in its own custom debug information record and can be
/// present or absent independently of the others.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EditAndContinueMethodDebugInformation {
    /// Ordinal of the method, or [`UNDEFINED_METHOD_ORDINAL`]
    pub method_ordinal: i32,
    /// Local slots in slot order, including placeholders for unused slots
    pub local_slots: Vec<LocalSlotDebugInfo>,
    /// Closures in ordinal order
    pub closures: Vec<ClosureDebugInfo>,
    /// Lambdas in ordinal order
    pub lambdas: Vec<LambdaDebugInfo>,
    /// Suspension points sorted by syntax offset and await id
    pub state_machine_states: Vec<StateMachineStateDebugInfo>,
}

impl Default for EditAndContinueMethodDebugInformation {
    fn default() -> Self {
        EditAndContinueMethodDebugInformation {
            method_ordinal: UNDEFINED_METHOD_ORDINAL,
            local_slots: Vec::new(),
            closures: Vec::new(),
            lambdas: Vec::new(),
            state_machine_states: Vec::new(),
        }
    }
}

impl EditAndContinueMethodDebugInformation {
    /// Rebuilds the method information from its three maps.
    ///
    /// An empty slice stands for an absent map.
    ///
    /// # Arguments
    ///
    /// * `compressed_slot_map` - Payload of an `EditAndContinueLocalSlotMap` record
    /// * `compressed_lambda_map` - Payload of an `EditAndContinueLambdaMap` record
    /// * `compressed_state_map` - Payload of an `EditAndContinueStateMachineStateMap` record
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidData`] if any of the maps can not be decoded.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn create(
        compressed_slot_map: &[u8],
        compressed_lambda_map: &[u8],
        compressed_state_map: &[u8],
    ) -> Result<Self> {
        let local_slots = deserialize_local_slots(compressed_slot_map)?;
        let (method_ordinal, closures, lambdas) = deserialize_lambda_map(compressed_lambda_map)?;
        let state_machine_states = deserialize_state_machine_states(compressed_state_map)?;

        Ok(EditAndContinueMethodDebugInformation {
            method_ordinal,
            local_slots,
            closures,
            lambdas,
            state_machine_states,
        })
    }

    /// Reads the method information from a complete custom debug information blob.
    ///
    /// Missing records leave the corresponding parts empty.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob framing is corrupted, or
    /// [`crate::Error::InvalidData`] if one of the maps can not be decoded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cdiscope::customdebuginfo::CustomDebugInfoEncoder;
    /// use cdiscope::editandcontinue::{ClosureDebugInfo, DebugId, EditAndContinueMethodDebugInformation};
    ///
    /// let info = EditAndContinueMethodDebugInformation {
    ///     method_ordinal: 2,
    ///     closures: vec![ClosureDebugInfo::new(-5, DebugId::new(0, 0))],
    ///     ..Default::default()
    /// };
    ///
    /// let mut encoder = CustomDebugInfoEncoder::new();
    /// encoder.add_edit_and_continue_lambda_map(&info)?;
    /// let blob = encoder.to_bytes().unwrap();
    ///
    /// assert_eq!(EditAndContinueMethodDebugInformation::from_custom_debug_info(&blob)?, info);
    /// # Ok::<(), cdiscope::Error>(())
    /// ```
    #[tracing::instrument(level = "trace", skip_all, fields(len = blob.len()))]
    pub fn from_custom_debug_info(blob: &[u8]) -> Result<Self> {
        let slot_map = try_get_custom_debug_info_record(
            blob,
            CustomDebugInfoKind::EditAndContinueLocalSlotMap,
        )?;
        let lambda_map =
            try_get_custom_debug_info_record(blob, CustomDebugInfoKind::EditAndContinueLambdaMap)?;
        let state_map = try_get_custom_debug_info_record(
            blob,
            CustomDebugInfoKind::EditAndContinueStateMachineStateMap,
        )?;

        Self::create(
            slot_map.as_deref().unwrap_or_default(),
            lambda_map.as_deref().unwrap_or_default(),
            state_map.as_deref().unwrap_or_default(),
        )
    }

    /// Appends the local slot map to `buffer`.
    ///
    /// # Errors
    /// See [`crate::editandcontinue::slotmap::serialize_local_slots`].
    pub fn serialize_local_slots(&self, buffer: &mut Vec<u8>) -> Result<()> {
        serialize_local_slots(&self.local_slots, buffer)
    }

    /// Appends the lambda map to `buffer`.
    ///
    /// # Errors
    /// See [`crate::editandcontinue::lambdamap::serialize_lambda_map`].
    pub fn serialize_lambda_map(&self, buffer: &mut Vec<u8>) -> Result<()> {
        serialize_lambda_map(self.method_ordinal, &self.closures, &self.lambdas, buffer)
    }

    /// Appends the state machine state map to `buffer`.
    ///
    /// # Errors
    /// See [`crate::editandcontinue::statemachine::serialize_state_machine_states`].
    pub fn serialize_state_machine_states(&self, buffer: &mut Vec<u8>) -> Result<()> {
        serialize_state_machine_states(&self.state_machine_states, buffer)
    }
}
