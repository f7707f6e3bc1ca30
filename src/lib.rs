// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cdiscope
//!
//! [![Crates.io](https://img.shields.io/crates/v/cdiscope.svg)](https://crates.io/crates/cdiscope)
//! [![Documentation](https://docs.rs/cdiscope/badge.svg)](https://docs.rs/cdiscope)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/cdiscope/blob/main/LICENSE-APACHE)
//!
//! Encoder and reader for .NET custom debug information and the Edit-and-Continue method debug
//! information stored inside it. Built in pure Rust, `cdiscope` reads blobs produced by .NET
//! compilers exactly, writes them bit-for-bit compatible, and rejects corrupted input with an
//! error pointing at the offending bytes.
//!
//! ## Features
//!
//! - **📦 Complete record coverage** - Using groups, forwarding, dynamic and tuple locals, state machine details
//! - **🔁 Edit-and-Continue maps** - Local slots, closures and lambdas, state machine states
//! - **🛡️ Hostile input** - Every read is bounds-checked, corrupted maps report offset and hex dump
//! - **⚡ Lazy reading** - Records are decoded one at a time, lookups stop at the first match
//!
//! ## Quick Start
//!
//! Add `cdiscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cdiscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use cdiscope::prelude::*;
//!
//! let info = EditAndContinueMethodDebugInformation {
//!     method_ordinal: 0,
//!     local_slots: vec![LocalSlotDebugInfo::new(
//!         SynthesizedLocalKind::UserDefined,
//!         LocalDebugId::new(12, 0),
//!     )],
//!     ..Default::default()
//! };
//!
//! let mut encoder = CustomDebugInfoEncoder::new();
//! encoder.add_edit_and_continue_method_debug_information(&info)?;
//! let blob = encoder.to_bytes().unwrap();
//!
//! let decoded = EditAndContinueMethodDebugInformation::from_custom_debug_info(&blob)?;
//! assert_eq!(decoded.local_slots, info.local_slots);
//! # Ok::<(), cdiscope::Error>(())
//! ```
//!
//! ### Reading Records
//!
//! ```rust
//! use cdiscope::customdebuginfo::{custom_debug_info_records, CustomDebugInfoKind};
//!
//! fn dump(blob: &[u8]) -> cdiscope::Result<()> {
//!     for record in custom_debug_info_records(blob)? {
//!         let record = record?;
//!         if let CustomDebugInfoKind::Unknown(kind) = record.kind {
//!             println!("unknown record kind {kind}");
//!             continue;
//!         }
//!         println!("{:?}: {} bytes", record.kind, record.data.len());
//!     }
//!     Ok(())
//! }
//! # dump(&[4, 0, 0, 0]).unwrap();
//! ```
//!
//! ## Architecture
//!
//! - [`encoding`] - Little-endian I/O, compressed integers and the [`Parser`] cursor
//! - [`customdebuginfo`] - Record framing: encoder, lazy reader, typed payload decoders
//! - [`editandcontinue`] - Edit-and-Continue model and its three compressed maps
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result`]. Corrupted framing is reported as
//! [`Error::Malformed`], corrupted Edit-and-Continue maps as [`Error::InvalidData`]. Benign
//! absence, such as a missing record or a blob written by an incompatible producer, is not an
//! error and surfaces as `None` or an empty collection.
//!
//! ## Logging
//!
//! `cdiscope` emits [`tracing`] events and spans at `trace` and `debug` level. No subscriber
//! is installed; applications opt in by installing their own.
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! cargo +nightly fuzz run cdi_reader --release
//! ```
//!
//! ### Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use cdiscope::prelude::*;
///
/// let mut encoder = CustomDebugInfoEncoder::new();
/// encoder.add_forward_method_info(0x0600_0002)?;
/// assert_eq!(encoder.record_count(), 1);
/// # Ok::<(), cdiscope::Error>(())
/// ```
pub mod prelude;

pub mod encoding;

pub mod customdebuginfo;

pub mod editandcontinue;

/// `cdiscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cdiscope` Error type
///
/// The main error type for all operations in this crate. Framing errors, corrupted
/// Edit-and-Continue maps and unrepresentable values each have their own variant.
///
/// # Examples
///
/// ```rust
/// use cdiscope::{editandcontinue::slotmap::deserialize_local_slots, Error};
///
/// match deserialize_local_slots(&[0x01, 0x68, 0xFF]) {
///     Ok(slots) => println!("{} slots", slots.len()),
///     Err(Error::InvalidData { offset, window }) => println!("bad map at {offset}: {window}"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Bounds-checked cursor used by every decoder.
///
/// See [`encoding::parser::Parser`] for details.
pub use encoding::parser::Parser;
