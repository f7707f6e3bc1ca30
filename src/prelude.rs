//! # cdiscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! cdiscope library. Import this module to get quick access to the encoder, the reader and
//! the Edit-and-Continue model.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cdiscope operations
pub use crate::Error;

/// The result type used throughout cdiscope
pub use crate::Result;

/// Low-level parsing cursor
pub use crate::Parser;

// ================================================================================================
// Custom Debug Information
// ================================================================================================

/// Record level encoding and reading
pub use crate::customdebuginfo::{
    custom_debug_info_records, try_get_custom_debug_info_record, CustomDebugInfoEncoder,
    CustomDebugInfoKind, CustomDebugInfoRecord,
};

/// Payloads of the fixed-layout record kinds
pub use crate::customdebuginfo::{
    DynamicLocalInfo, StateMachineHoistedLocalScope, TupleElementNamesInfo,
};

// ================================================================================================
// Edit-and-Continue
// ================================================================================================

/// Edit-and-Continue method debug information
pub use crate::editandcontinue::{
    AwaitDebugId, ClosureDebugInfo, DebugId, EditAndContinueMethodDebugInformation,
    LambdaDebugInfo, LocalDebugId, LocalSlotDebugInfo, StateMachineState,
    StateMachineStateDebugInfo, SynthesizedLocalKind,
};
