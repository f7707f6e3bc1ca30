//! Custom debug information container.
//!
//! Compilers attach a custom debug information blob to methods whose debugging needs go beyond
//! what the symbol format itself records: namespace import groups, forwarding to another
//! method's information, dynamic and tuple typed locals, state machine details and the
//! Edit-and-Continue maps. The blob is a 4-byte global header followed by self-describing
//! records, each tagged with a [`crate::customdebuginfo::CustomDebugInfoKind`].
//!
//! # Key Components
//!
//! - [`crate::customdebuginfo::CustomDebugInfoEncoder`] - Builds a blob record by record
//! - [`crate::customdebuginfo::custom_debug_info_records`] - Iterates the records of a blob
//! - [`crate::customdebuginfo::try_get_custom_debug_info_record`] - Finds the first record of a kind
//! - `decode_*` functions - Decode the payloads of the fixed-layout record kinds
//!
//! # Format
//!
//! ```text
//! global header:  version:u8 = 4 | record count:u8 | padding:u16
//! record header:  version:u8 = 4 | kind:u8 | reserved:u8 | alignment:u8 | size:u32 LE
//! ```
//!
//! Every record ends on a 4-byte boundary relative to the start of the blob. The record count
//! of the global header is informational; readers walk the records until the blob ends.
//!
//! # Examples
//!
//! ```rust
//! use cdiscope::customdebuginfo::{
//!     decode_tuple_element_names, try_get_custom_debug_info_record, CustomDebugInfoEncoder,
//!     CustomDebugInfoKind, TupleElementNamesInfo,
//! };
//!
//! let local = TupleElementNamesInfo {
//!     element_names: vec![Some("x".into()), None],
//!     slot_index: 0,
//!     local_name: "t".into(),
//!     ..Default::default()
//! };
//!
//! let mut encoder = CustomDebugInfoEncoder::new();
//! encoder.add_tuple_element_names(&[local.clone()])?;
//! let blob = encoder.to_bytes().unwrap();
//!
//! let data = try_get_custom_debug_info_record(&blob, CustomDebugInfoKind::TupleElementNames)?
//!     .unwrap();
//! assert_eq!(decode_tuple_element_names(&data)?, [local]);
//! # Ok::<(), cdiscope::Error>(())
//! ```

mod decoders;
mod encoder;
mod reader;
mod types;

pub use decoders::{
    decode_dynamic_locals, decode_forward_record, decode_state_machine_hoisted_local_scopes,
    decode_state_machine_type_name, decode_tuple_element_names, decode_using_groups,
};
pub use encoder::{CustomDebugInfoEncoder, MAX_RECORD_COUNT};
pub use reader::{custom_debug_info_records, try_get_custom_debug_info_record, CustomDebugInfoRecords};
pub use types::*;
